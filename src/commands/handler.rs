use std::collections::HashSet;
use std::error::Error;

use crate::commands::context::CommandContext;
use crate::commands::proposal::Proposal;

/// What a handler invocation produces. Handlers are free to fail with
/// any error shape; the dispatcher wraps whatever comes back into the
/// single execution error kind.
pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// A registered unit of executable command behavior.
///
/// Every handler answers to one or more aliases. The first alias is the
/// canonical display name, used when listing commands for empty input.
/// Aliases keep their declared casing for display while all lookups
/// fold case.
pub trait CommandHandler: Send + Sync {
    /// Alias strings this handler answers to, in declaration order.
    /// Must be non-empty; blank aliases are rejected at registration.
    fn aliases(&self) -> Vec<String>;

    /// Run the command for one invocation context.
    fn execute(&self, ctx: &CommandContext) -> HandlerResult;

    /// Whether the handler asks to be treated as hidden. This is only
    /// the default visibility rule; a context may install its own
    /// predicate that overrides it.
    fn hidden(&self) -> bool {
        false
    }

    /// Capability query for argument completion: handlers able to
    /// complete their own arguments return themselves here.
    fn as_proposal_source(&self) -> Option<&dyn ProposalSource> {
        None
    }
}

/// Optional capability of a [`CommandHandler`]: supply completions when
/// the input hangs mid-argument instead of mid-command-name.
pub trait ProposalSource {
    /// Completions for a hanging invocation of this handler. The
    /// dispatcher returns the result verbatim.
    fn proposals(&self, ctx: &CommandContext) -> HashSet<Proposal>;
}
