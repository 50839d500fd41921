//! End-to-end atomicity tests.
//!
//! These run whole action sequences through [`Layer::execute`] against a [`Memory`] store and
//! check that a rejected action leaves the committed store byte-for-byte as it was, while the
//! surrounding accepted actions still land.

use crate::mocks::{
    account_key, create_account_action, create_domain_action, group_from_seed, permission,
    MockContext,
};
use crate::{Layer, Memory, State};
use commonware_codec::{DecodeExt, Encode};
use proptest::prelude::*;
use tessera_types::execution::{
    Action, Event, IssueTokens, Key, TransferBalance, TransferToken, UpdateDomain, Value,
};
use tessera_types::{Account, Asset, GroupId, GroupWeight};

fn run(state: &mut Memory, actions: Vec<Action>) -> Vec<Event> {
    let (events, changes) = {
        let mut layer = Layer::new(&*state);
        let actions = actions
            .into_iter()
            .map(|action| (MockContext::allow_all(), action))
            .collect();
        let events = layer.execute(actions).expect("store never fails");
        (events, layer.commit())
    };
    state.apply(changes).expect("apply changes");
    events
}

/// Encodes every record so comparisons cover the persisted bytes.
fn snapshot(state: &Memory) -> Vec<(Vec<u8>, Vec<u8>)> {
    state
        .iter()
        .map(|(key, value)| (key.encode().to_vec(), value.encode().to_vec()))
        .collect()
}

fn is_rejected(event: &Event) -> bool {
    matches!(event, Event::Rejected { .. })
}

fn issue(domain: &str, names: &[&str]) -> Action {
    Action::IssueTokens(IssueTokens {
        domain: domain.to_string(),
        names: names.iter().map(|n| n.to_string()).collect(),
        owner: vec![account_key(1)],
    })
}

fn transfer(from: &str, to: &str, amount: u64) -> Action {
    Action::TransferBalance(TransferBalance {
        from: from.to_string(),
        to: to.to_string(),
        amount: Asset::new(amount),
    })
}

fn seed_account(state: &mut Memory, name: &str, balance: u64) {
    let account = Account {
        name: name.to_string(),
        creator: tessera_types::constants::SYSTEM_ACCOUNT.to_string(),
        balance: Asset::new(balance),
        frozen_balance: Asset::ZERO,
        owner: vec![account_key(7)],
    };
    state
        .insert(Key::Account(name.to_string()), Value::Account(account))
        .unwrap();
}

fn balance(state: &Memory, name: &str) -> u64 {
    match state.get(&Key::Account(name.to_string())).unwrap() {
        Some(Value::Account(account)) => account.balance.amount(),
        other => panic!("expected account, got {other:?}"),
    }
}

#[test]
fn duplicate_create_domain_changes_nothing() {
    let mut state = Memory::default();
    run(
        &mut state,
        vec![create_domain_action("art", vec![group_from_seed(1, 1)])],
    );
    let before = snapshot(&state);

    let events = run(
        &mut state,
        vec![create_domain_action("art", vec![group_from_seed(2, 1)])],
    );
    assert!(is_rejected(&events[0]));
    assert_eq!(snapshot(&state), before);
    assert!(state
        .get(&Key::Group(group_from_seed(2, 1).id))
        .unwrap()
        .is_none());
}

#[test]
fn repeated_issue_name_persists_neither_token() {
    let mut state = Memory::default();
    let events = run(
        &mut state,
        vec![
            create_domain_action("art", vec![group_from_seed(1, 1)]),
            issue("art", &["a", "a"]),
            issue("art", &["b"]),
        ],
    );
    assert!(!is_rejected(&events[0]));
    assert!(is_rejected(&events[1]));
    assert!(!is_rejected(&events[2]));

    let token = |name: &str| Key::Token {
        domain: "art".to_string(),
        name: name.to_string(),
    };
    assert!(state.get(&token("a")).unwrap().is_none());
    assert!(state.get(&token("b")).unwrap().is_some());
}

#[test]
fn unmanageable_domain_keeps_zero_threshold_rule() {
    let mut state = Memory::default();
    let group = group_from_seed(1, 1);
    let mut create = create_domain_action("frozen", vec![group.clone()]);
    if let Action::CreateDomain(act) = &mut create {
        act.manage = permission("manage", 0, vec![]);
    }
    let zero_manage = |issue_threshold: u32| {
        Action::UpdateDomain(UpdateDomain {
            name: "frozen".to_string(),
            groups: vec![],
            issue: Some(permission(
                "issue",
                issue_threshold,
                vec![GroupWeight::new(group.id, 1)],
            )),
            transfer: None,
            manage: Some(permission("manage", 0, vec![])),
        })
    };

    let events = run(&mut state, vec![create, zero_manage(0), zero_manage(1)]);
    assert!(!is_rejected(&events[0]));
    // A zero issue threshold sinks the whole update, including its valid manage field.
    assert!(is_rejected(&events[1]));
    assert!(!is_rejected(&events[2]));
}

#[test]
fn receiver_overflow_leaves_both_balances() {
    let mut state = Memory::default();
    seed_account(&mut state, "a", 1_000);
    seed_account(&mut state, "b", u64::MAX - 10);
    let before = snapshot(&state);

    let events = run(&mut state, vec![transfer("a", "b", 11)]);
    assert!(matches!(
        &events[0],
        Event::Rejected { reason, .. } if reason.contains("overflow")
    ));
    assert_eq!(snapshot(&state), before);

    run(&mut state, vec![transfer("a", "b", 10)]);
    assert_eq!(balance(&state, "a"), 990);
    assert_eq!(balance(&state, "b"), u64::MAX);
}

#[test]
fn owner_placeholder_is_transfer_only() {
    let mut state = Memory::default();
    let group = group_from_seed(1, 1);
    let mut bad = create_domain_action("art", vec![group.clone()]);
    if let Action::CreateDomain(act) = &mut bad {
        act.manage = permission(
            "manage",
            1,
            vec![GroupWeight::new(group.id, 1), GroupWeight::owner(1)],
        );
    }

    let events = run(
        &mut state,
        vec![
            bad,
            create_domain_action("art", vec![group]),
            issue("art", &["a"]),
            Action::TransferToken(TransferToken {
                domain: "art".to_string(),
                name: "a".to_string(),
                to: vec![account_key(2)],
            }),
        ],
    );
    assert!(is_rejected(&events[0]));
    assert!(events[1..].iter().all(|e| !is_rejected(e)));
}

#[test]
fn group_references_must_resolve_exactly_once() {
    let mut state = Memory::default();
    let stored = group_from_seed(1, 1);
    run(&mut state, vec![create_domain_action("art", vec![stored.clone()])]);
    let before = snapshot(&state);

    let dangling = GroupId::new([0xAB; 32]);
    let mut neither = create_domain_action("music", vec![group_from_seed(2, 1)]);
    if let Action::CreateDomain(act) = &mut neither {
        act.issue = permission("issue", 1, vec![GroupWeight::new(dangling, 1)]);
    }
    let both = Action::UpdateDomain(UpdateDomain {
        name: "art".to_string(),
        groups: vec![stored.clone()],
        issue: Some(permission("issue", 1, vec![GroupWeight::new(stored.id, 1)])),
        transfer: None,
        manage: None,
    });

    let events = run(&mut state, vec![neither, both]);
    assert!(events.iter().all(is_rejected));
    assert_eq!(snapshot(&state), before);
}

#[test]
fn batch_continues_after_rejection() {
    let mut state = Memory::default();
    let events = run(
        &mut state,
        vec![
            create_account_action("alice", 1),
            create_account_action("bob", 2),
            transfer("alice", "bob", 20_000),
            transfer("alice", "bob", 2_500),
        ],
    );
    assert!(is_rejected(&events[2]));
    assert_eq!(balance(&state, "alice"), 7_500);
    assert_eq!(balance(&state, "bob"), 12_500);
}

#[test]
fn json_fixture_commits_only_decodable_records() {
    let fixture = serde_json::json!([
        { "type": "create_account", "name": "alice", "owner": [] },
        { "type": "create_account", "name": "bob", "owner": [] },
        { "type": "transfer_balance", "from": "alice", "to": "bob", "amount": 250 },
        { "type": "create_account", "name": "n".repeat(65), "owner": [] },
    ]);
    let actions: Vec<Action> = serde_json::from_value(fixture).expect("fixture parses");

    let mut state = Memory::default();
    let events = run(&mut state, actions);
    assert!(events[..3].iter().all(|e| !is_rejected(e)));
    assert!(matches!(
        &events[3],
        Event::Rejected { reason, .. } if reason.contains("limit")
    ));
    assert_eq!(balance(&state, "bob"), 10_250);

    assert_eq!(state.len(), 2);
    for (key, value) in state.iter() {
        assert_eq!(&Key::decode(key.encode()).expect("decode key"), key);
        assert_eq!(&Value::decode(value.encode()).expect("decode value"), value);
    }
}

proptest! {
    #[test]
    fn transfer_conserves_or_rejects(
        sender in 0u64..=u64::MAX,
        receiver in 0u64..=u64::MAX,
        amount in 0u64..=u64::MAX,
    ) {
        let mut state = Memory::default();
        seed_account(&mut state, "a", sender);
        seed_account(&mut state, "b", receiver);

        let events = run(&mut state, vec![transfer("a", "b", amount)]);
        let valid = amount > 0 && amount <= sender && receiver.checked_add(amount).is_some();
        prop_assert_eq!(!is_rejected(&events[0]), valid);
        if valid {
            prop_assert_eq!(balance(&state, "a"), sender - amount);
            prop_assert_eq!(balance(&state, "b"), receiver + amount);
        } else {
            prop_assert_eq!(balance(&state, "a"), sender);
            prop_assert_eq!(balance(&state, "b"), receiver);
        }
    }
}
