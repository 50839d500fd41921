//! Tessera execution layer.
//!
//! This crate applies decoded ledger actions (domains, tokens, groups, accounts) to a key-value
//! store. The primary entrypoint is [`Layer`]: it reads through to a [`State`], stages every
//! write in memory, and hands back the staged set for the caller to persist in one unit.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution; time comes from [`Context::current_time`].
//! - Do not use randomness.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Atomicity
//! Every handler completes all of its checks before staging a write. A rejected action therefore
//! stages nothing, and a multi-record effect (a domain with its groups, a batch of tokens, both
//! sides of a balance transfer) is staged entirely or not at all.
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use tessera_execution::{Layer, Memory, State};
//!
//! # fn example(
//! #     state: &mut Memory,
//! #     actions: Vec<(impl tessera_execution::Context, tessera_types::Action)>,
//! # ) -> anyhow::Result<()> {
//! let (events, changes) = {
//!     let mut layer = Layer::new(&*state);
//!     let events = layer.execute(actions)?;
//!     (events, layer.commit())
//! };
//! state.apply(changes)?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod layer;
mod state;

pub use context::Context;
pub use error::ActionError;
pub use layer::Layer;
pub use state::{Memory, State, Status};

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod atomicity_tests;
