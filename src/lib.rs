//! Runtime command registry and dispatcher with layered completion.
//!
//! This crate provides the pieces a line-oriented front-end needs to
//! route typed commands:
//!
//! - [`CommandHandler`] -- the trait every command implements
//! - [`CommandRegistry`] -- thread-safe, case-insensitive alias table
//! - [`CommandDispatcher`] -- execution and completion entry points
//! - [`CommandContext`] -- one parsed invocation and its visibility rule
//! - [`Proposal`] / [`Priority`] -- completion candidates
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use scmd::{CommandContext, CommandDispatcher, CommandHandler, CommandRegistry, HandlerResult};
//!
//! struct Greet;
//!
//! impl CommandHandler for Greet {
//!     fn aliases(&self) -> Vec<String> {
//!         vec!["greet".into(), "hello".into()]
//!     }
//!
//!     fn execute(&self, _ctx: &CommandContext) -> HandlerResult {
//!         println!("hi there");
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), scmd::ScmdError> {
//! let registry = CommandRegistry::new();
//! registry.add(Arc::new(Greet))?;
//!
//! let dispatcher = CommandDispatcher::new(registry);
//! assert!(dispatcher.execute(&CommandContext::new("HELLO"))?);
//!
//! let proposals = dispatcher.suggest(&CommandContext::new("gr"));
//! assert!(proposals.iter().any(|p| p.text == "eet"));
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod core;

pub use crate::commands::{
    CommandContext, CommandDispatcher, CommandHandler, CommandRegistry, HandlerResult, Priority,
    Proposal, ProposalSource, VisibilityPredicate,
};
pub use crate::config::Config;
pub use crate::core::error::ScmdError;
