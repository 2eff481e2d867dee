//! Command registration, dispatch, and completion proposals.

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod proposal;
pub mod registry;

#[cfg(test)]
pub(crate) mod testkit;

pub use context::{CommandContext, VisibilityPredicate};
pub use dispatcher::CommandDispatcher;
pub use handler::{CommandHandler, HandlerResult, ProposalSource};
pub use proposal::{Priority, Proposal};
pub use registry::CommandRegistry;
