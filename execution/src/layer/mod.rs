use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use tessera_types::execution::{Action, Event, Key, Value};
use tracing::debug;

use crate::context::Context;
use crate::error::ActionError;
use crate::state::{State, Status};

mod handlers;

/// Applies actions on top of a read-only store, staging every write in memory.
///
/// Handlers finish all validation before staging anything, so a rejected action leaves the
/// pending set exactly as it found it. The caller persists the staged set in one unit via
/// [`State::apply`] on the output of [`Layer::commit`].
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn exists(&self, key: &Key) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Applies a single action, returning the event it produced.
    pub fn apply(
        &mut self,
        context: &impl Context,
        action: &Action,
    ) -> Result<Event, ActionError> {
        match action {
            Action::CreateDomain(act) => self.handle_create_domain(context, act),
            Action::IssueTokens(act) => self.handle_issue_tokens(context, act),
            Action::TransferToken(act) => self.handle_transfer_token(context, act),
            Action::UpdateGroup(act) => self.handle_update_group(context, act),
            Action::UpdateDomain(act) => self.handle_update_domain(context, act),
            Action::CreateAccount(act) => self.handle_create_account(context, act),
            Action::UpdateOwner(act) => self.handle_update_owner(context, act),
            Action::TransferBalance(act) => self.handle_transfer_balance(context, act),
        }
    }

    /// Applies `actions` strictly in order.
    ///
    /// Rejected actions become [`Event::Rejected`] and execution moves on to the next action; a
    /// store failure aborts the whole batch.
    pub fn execute<C: Context>(&mut self, actions: Vec<(C, Action)>) -> Result<Vec<Event>> {
        let mut events = Vec::with_capacity(actions.len());
        for (index, (context, action)) in actions.into_iter().enumerate() {
            match self.apply(&context, &action) {
                Ok(event) => events.push(event),
                Err(ActionError::State(err)) => {
                    return Err(err)
                        .with_context(|| format!("apply {} (index={index})", action.name()));
                }
                Err(err) => {
                    debug!(
                        action = action.name(),
                        index,
                        reason = %err,
                        "action rejected"
                    );
                    events.push(Event::Rejected {
                        action: action.name().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(events)
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key)?,
        })
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
