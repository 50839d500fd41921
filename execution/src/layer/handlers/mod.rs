use super::*;
use commonware_cryptography::ed25519::PublicKey;
use tessera_types::constants::{
    ISSUE_PERMISSION, MANAGE_PERMISSION, MAX_GROUP_KEYS, MAX_NAME_LENGTH, MAX_OWNER_KEYS,
    MAX_PERMISSION_GROUPS, TRANSFER_PERMISSION,
};
use tessera_types::{Group, KeyWeight, Permission};

mod account;
mod domain;
mod token;

/// The three permission slots of a domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Issue,
    Transfer,
    Manage,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Self::Issue => ISSUE_PERMISSION,
            Self::Transfer => TRANSFER_PERMISSION,
            Self::Manage => MANAGE_PERMISSION,
        }
    }

    /// Only the transfer rule may defer to the token's current owner.
    fn allows_owner(self) -> bool {
        matches!(self, Self::Transfer)
    }

    /// A manage threshold of 0 freezes the domain's rules forever.
    fn allows_zero_threshold(self) -> bool {
        matches!(self, Self::Manage)
    }
}

/// Rejects a field longer than the store codec will read back.
fn check_limit(field: &'static str, len: usize, max: usize) -> Result<(), ActionError> {
    if len > max {
        return Err(ActionError::LimitExceeded { field, len, max });
    }
    Ok(())
}

fn check_name(field: &'static str, name: &str) -> Result<(), ActionError> {
    check_limit(field, name.len(), MAX_NAME_LENGTH)
}

fn check_owner(field: &'static str, owner: &[PublicKey]) -> Result<(), ActionError> {
    if owner.is_empty() {
        return Err(ActionError::EmptyField { field });
    }
    check_limit(field, owner.len(), MAX_OWNER_KEYS)
}

fn check_group_keys(keys: &[KeyWeight]) -> Result<(), ActionError> {
    if keys.is_empty() {
        return Err(ActionError::EmptyField { field: "group keys" });
    }
    check_limit("group keys", keys.len(), MAX_GROUP_KEYS)
}

/// Checks every group a domain action defines: well-formed, and `id` derived from `key`.
fn check_defined_groups(groups: &[Group]) -> Result<(), ActionError> {
    for group in groups {
        check_limit("group keys", group.keys.len(), MAX_GROUP_KEYS)?;
        group
            .validate()
            .map_err(|reason| ActionError::MalformedThreshold {
                subject: format!("group {}", group.id),
                reason,
            })?;
        if !group.has_derived_id() {
            return Err(ActionError::GroupIdMismatch { id: group.id });
        }
    }
    Ok(())
}

/// Checks a permission's name and threshold set in isolation.
fn check_permission_shape(permission: &Permission, role: Role) -> Result<(), ActionError> {
    if permission.name != role.name() {
        return Err(ActionError::InvalidPermissionName {
            expected: role.name(),
            provided: permission.name.clone(),
        });
    }
    check_limit(
        "permission groups",
        permission.groups.len(),
        MAX_PERMISSION_GROUPS,
    )?;
    if permission.threshold == 0 && !role.allows_zero_threshold() {
        return Err(ActionError::ZeroThreshold {
            permission: role.name(),
        });
    }
    permission
        .validate()
        .map_err(|reason| ActionError::MalformedThreshold {
            subject: format!("{} permission", role.name()),
            reason,
        })
}

impl<'a, S: State> Layer<'a, S> {
    /// Resolves every group referenced by `permission`.
    ///
    /// The owner placeholder is accepted only when the role allows it. Any other id must be found
    /// in exactly one of the store or `defined`: both means the request shadows a stored group,
    /// neither means the reference dangles.
    fn check_permission_references(
        &self,
        permission: &Permission,
        role: Role,
        defined: &[Group],
    ) -> Result<(), ActionError> {
        let allow_owner = role.allows_owner();
        if permission.references_owner() && !allow_owner {
            return Err(ActionError::OwnerGroupNotAllowed {
                permission: role.name(),
            });
        }
        for reference in &permission.groups {
            if reference.id.is_owner() {
                continue;
            }
            let stored = self.exists(&Key::Group(reference.id))?;
            let is_defined = defined.iter().any(|g| g.id == reference.id);
            if stored == is_defined {
                return Err(ActionError::GroupReferenceConflict {
                    permission: role.name(),
                    id: reference.id,
                });
            }
        }
        Ok(())
    }
}

fn require_authorized(
    context: &impl Context,
    namespace: &str,
    subject: &str,
) -> Result<(), ActionError> {
    if context.is_authorized(namespace, subject) {
        Ok(())
    } else {
        Err(ActionError::unauthorized(namespace, subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{group_from_seed, permission, MockContext};
    use crate::state::Memory;
    use tessera_types::{GroupId, GroupWeight, ThresholdError};

    fn store_with_group(seed: u64) -> (Memory, Group) {
        let group = group_from_seed(seed, 1);
        let mut state = Memory::default();
        state
            .insert(Key::Group(group.id), Value::Group(group.clone()))
            .unwrap();
        (state, group)
    }

    #[test]
    fn reference_to_stored_group_resolves() {
        let (state, stored) = store_with_group(1);
        let layer = Layer::new(&state);
        let p = permission("issue", 1, vec![GroupWeight::new(stored.id, 1)]);
        layer
            .check_permission_references(&p, Role::Issue, &[])
            .expect("stored reference");
    }

    #[test]
    fn reference_to_defined_group_resolves() {
        let state = Memory::default();
        let layer = Layer::new(&state);
        let defined = group_from_seed(2, 1);
        let p = permission("issue", 1, vec![GroupWeight::new(defined.id, 1)]);
        layer
            .check_permission_references(&p, Role::Issue, &[defined])
            .expect("defined reference");
    }

    #[test]
    fn reference_to_both_stored_and_defined_fails() {
        let (state, stored) = store_with_group(1);
        let layer = Layer::new(&state);
        let p = permission("issue", 1, vec![GroupWeight::new(stored.id, 1)]);
        let err = layer
            .check_permission_references(&p, Role::Issue, &[stored.clone()])
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::GroupReferenceConflict { id, .. } if id == stored.id
        ));
    }

    #[test]
    fn dangling_reference_fails() {
        let state = Memory::default();
        let layer = Layer::new(&state);
        let missing = GroupId::new([7u8; 32]);
        let p = permission("manage", 1, vec![GroupWeight::new(missing, 1)]);
        let err = layer
            .check_permission_references(&p, Role::Manage, &[])
            .unwrap_err();
        assert!(matches!(err, ActionError::GroupReferenceConflict { .. }));
    }

    #[test]
    fn owner_placeholder_allowed_only_for_transfer() {
        let state = Memory::default();
        let layer = Layer::new(&state);
        let owner = vec![GroupWeight::owner(1)];

        let transfer = permission("transfer", 1, owner.clone());
        layer
            .check_permission_references(&transfer, Role::Transfer, &[])
            .expect("owner in transfer");
        for role in [Role::Issue, Role::Manage] {
            let p = permission(role.name(), 1, owner.clone());
            let err = layer
                .check_permission_references(&p, role, &[])
                .unwrap_err();
            assert!(matches!(err, ActionError::OwnerGroupNotAllowed { .. }));
        }
    }

    #[test]
    fn shape_rejects_wrong_name_and_zero_threshold() {
        let g = GroupWeight::new(GroupId::new([1u8; 32]), 1);
        assert!(matches!(
            check_permission_shape(&permission("transfer", 1, vec![g.clone()]), Role::Issue),
            Err(ActionError::InvalidPermissionName { expected: "issue", .. })
        ));
        for role in [Role::Issue, Role::Transfer] {
            assert!(matches!(
                check_permission_shape(&permission(role.name(), 0, vec![g.clone()]), role),
                Err(ActionError::ZeroThreshold { .. })
            ));
        }
        check_permission_shape(&permission("manage", 0, vec![]), Role::Manage)
            .expect("manage threshold may be zero");
        assert!(matches!(
            check_permission_shape(&permission("issue", 2, vec![g]), Role::Issue),
            Err(ActionError::MalformedThreshold {
                reason: ThresholdError::BelowThreshold { .. },
                ..
            })
        ));
    }

    #[test]
    fn shape_and_groups_respect_codec_limits() {
        let refs: Vec<GroupWeight> = (0..=MAX_PERMISSION_GROUPS)
            .map(|i| {
                let mut id = [0u8; 32];
                id[..8].copy_from_slice(&(u64::MAX - i as u64).to_be_bytes());
                GroupWeight::new(GroupId::new(id), 1)
            })
            .collect();
        assert!(matches!(
            check_permission_shape(&permission("issue", 1, refs), Role::Issue),
            Err(ActionError::LimitExceeded { field: "permission groups", .. })
        ));

        let mut group = group_from_seed(4, 1);
        group.keys = crate::mocks::key_weights(
            &(0..=MAX_GROUP_KEYS as u64).map(|seed| (seed, 1)).collect::<Vec<_>>(),
        );
        assert!(matches!(
            check_defined_groups(&[group]),
            Err(ActionError::LimitExceeded { field: "group keys", .. })
        ));
    }

    #[test]
    fn defined_groups_must_derive_id_from_key() {
        let mut group = group_from_seed(3, 1);
        check_defined_groups(std::slice::from_ref(&group)).expect("derived id");
        group.id = GroupId::new([9u8; 32]);
        assert!(matches!(
            check_defined_groups(&[group]),
            Err(ActionError::GroupIdMismatch { .. })
        ));
    }

    #[test]
    fn authorization_is_required() {
        assert!(require_authorized(&MockContext::allow_all(), "domain", "art").is_ok());
        assert!(matches!(
            require_authorized(&MockContext::deny_all(), "domain", "art"),
            Err(ActionError::Unauthorized { .. })
        ));
    }
}
