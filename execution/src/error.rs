use tessera_types::{Asset, GroupId, ThresholdError};
use thiserror::Error as ThisError;

/// Why an action was not applied.
///
/// Every variant except [`ActionError::State`] is a validation failure: the action is rejected and
/// nothing it would have written is staged. `State` means the store itself failed and execution
/// of the block cannot continue.
#[derive(Debug, ThisError)]
pub enum ActionError {
    #[error("authorized information doesn't match ({namespace}/{subject})")]
    Unauthorized { namespace: String, subject: String },
    #[error("{entity} {name} does not exist")]
    NotFound { entity: &'static str, name: String },
    #[error("{entity} {name} already exists")]
    AlreadyExists { entity: &'static str, name: String },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("permission name must be {expected}, provided: {provided}")]
    InvalidPermissionName {
        expected: &'static str,
        provided: String,
    },
    #[error("{field} has length {len}, limit is {max}")]
    LimitExceeded {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{permission} permission threshold must be positive")]
    ZeroThreshold { permission: &'static str },
    #[error("{subject} is not valid: {reason}")]
    MalformedThreshold {
        subject: String,
        reason: ThresholdError,
    },
    #[error("group {id} does not match the id derived from its key")]
    GroupIdMismatch { id: GroupId },
    #[error("owner group is not allowed in {permission} permission")]
    OwnerGroupNotAllowed { permission: &'static str },
    #[error("group {id} in {permission} permission must be stored or defined (exactly one)")]
    GroupReferenceConflict {
        permission: &'static str,
        id: GroupId,
    },
    #[error("transfer amount must be positive")]
    InvalidAmount,
    #[error("account {name} cannot transfer to itself")]
    SelfTransfer { name: String },
    #[error("account {name} has insufficient balance (balance={balance}, required={required})")]
    InsufficientBalance {
        name: String,
        balance: Asset,
        required: Asset,
    },
    #[error("balance of account {name} would overflow")]
    Overflow { name: String },
    #[error("state error: {0:#}")]
    State(#[from] anyhow::Error),
}

impl ActionError {
    /// Whether this is a validation failure (as opposed to a store failure).
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::State(_))
    }

    pub(crate) fn unauthorized(namespace: &str, subject: &str) -> Self {
        Self::Unauthorized {
            namespace: namespace.to_string(),
            subject: subject.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            name: name.into(),
        }
    }

    pub(crate) fn already_exists(entity: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            name: name.into(),
        }
    }
}
