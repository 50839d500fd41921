//! Ledger-wide constants.
//!
//! Every node must agree on these values, so none of them are runtime-configurable.

/// Balance credited to every newly created account.
pub const INITIAL_ACCOUNT_BALANCE: u64 = 10_000;

/// Reserved identity recorded as the creator of every account.
pub const SYSTEM_ACCOUNT: &str = "tessera";

/// Role name of the permission gating token issuance.
pub const ISSUE_PERMISSION: &str = "issue";
/// Role name of the permission gating token transfer.
pub const TRANSFER_PERMISSION: &str = "transfer";
/// Role name of the permission gating domain updates.
pub const MANAGE_PERMISSION: &str = "manage";

/// Authorization namespace for domain creation.
pub const DOMAIN_NAMESPACE: &str = "domain";
/// Authorization namespace for group updates.
pub const GROUP_NAMESPACE: &str = "group";
/// Authorization namespace for account operations.
pub const ACCOUNT_NAMESPACE: &str = "account";

// Codec bounds (decoding only).
pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_GROUP_KEYS: usize = 256;
pub const MAX_PERMISSION_GROUPS: usize = 256;
pub const MAX_OWNER_KEYS: usize = 64;
pub const MAX_ISSUE_NAMES: usize = 1024;
pub const MAX_ACTION_GROUPS: usize = 64;
