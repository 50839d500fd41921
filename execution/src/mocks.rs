//! Deterministic fixtures for exercising the execution layer.

use crate::context::Context;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use std::collections::BTreeSet;
use tessera_types::execution::{Action, CreateAccount, CreateDomain};
use tessera_types::{Group, GroupWeight, KeyWeight, Permission};

/// A [`Context`] backed by an explicit allow-list and a fixed clock.
#[derive(Clone, Debug, Default)]
pub struct MockContext {
    allow_all: bool,
    allowed: BTreeSet<(String, String)>,
    time: u64,
}

impl MockContext {
    /// Authorizes every `(namespace, subject)`.
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    /// Authorizes nothing.
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn authorize(mut self, namespace: &str, subject: &str) -> Self {
        self.allowed
            .insert((namespace.to_string(), subject.to_string()));
        self
    }

    pub fn at(mut self, time: u64) -> Self {
        self.time = time;
        self
    }
}

impl Context for MockContext {
    fn is_authorized(&self, namespace: &str, subject: &str) -> bool {
        self.allow_all
            || self
                .allowed
                .contains(&(namespace.to_string(), subject.to_string()))
    }

    fn current_time(&self) -> u64 {
        self.time
    }
}

/// Creates an Ed25519 keypair from `seed`.
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

pub fn account_key(seed: u64) -> PublicKey {
    create_account_keypair(seed).1
}

/// Key weights for `(seed, weight)` pairs, sorted by increasing key.
pub fn key_weights(entries: &[(u64, u16)]) -> Vec<KeyWeight> {
    let mut keys: Vec<KeyWeight> = entries
        .iter()
        .map(|&(seed, weight)| KeyWeight::new(account_key(seed), weight))
        .collect();
    keys.sort_by(|a, b| a.key.cmp(&b.key));
    keys
}

/// A single-key group originating from `seed`, satisfied by that key alone.
pub fn group_from_seed(seed: u64, weight: u16) -> Group {
    let key = account_key(seed);
    Group {
        id: tessera_types::GroupId::from_key(&key),
        key: key.clone(),
        threshold: u32::from(weight),
        keys: vec![KeyWeight::new(key, weight)],
    }
}

pub fn permission(name: &str, threshold: u32, groups: Vec<GroupWeight>) -> Permission {
    Permission {
        name: name.to_string(),
        threshold,
        groups,
    }
}

/// A create-domain action whose issue and manage rules require the first group in `groups`,
/// and whose transfer rule defers to the token owner.
pub fn create_domain_action(name: &str, groups: Vec<Group>) -> Action {
    let first: Vec<GroupWeight> = groups
        .first()
        .map(|group| vec![GroupWeight::new(group.id, 1)])
        .unwrap_or_default();
    Action::CreateDomain(CreateDomain {
        name: name.to_string(),
        issuer: account_key(0),
        groups,
        issue: permission("issue", 1, first.clone()),
        transfer: permission("transfer", 1, vec![GroupWeight::owner(1)]),
        manage: permission("manage", 1, first),
    })
}

pub fn create_account_action(name: &str, seed: u64) -> Action {
    Action::CreateAccount(CreateAccount {
        name: name.to_string(),
        owner: vec![account_key(seed)],
    })
}
