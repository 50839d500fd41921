//! Common types used throughout tessera.
//!
//! Ledger records, decoded actions, store keys/values and the weighted-threshold rules every
//! permission and group must satisfy.

pub mod asset;
pub mod codec;
pub mod constants;
pub mod execution;
pub mod ledger;
pub mod permission;

pub use asset::Asset;
pub use execution::{
    Action, CreateAccount, CreateDomain, Event, IssueTokens, Key, TransferBalance, TransferToken,
    UpdateDomain, UpdateGroup, UpdateOwner, Value,
};
pub use ledger::{Account, Domain, Token};
pub use permission::{Group, GroupId, GroupWeight, KeyWeight, Permission, ThresholdError};
