use std::any::Any;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::commands::context::CommandContext;
use crate::commands::proposal::{self, Proposal};
use crate::commands::registry::CommandRegistry;
use crate::core::error::ScmdError;

/// Routes parsed input to registered handlers and answers completion
/// queries against the live registry.
#[derive(Clone, Debug)]
pub struct CommandDispatcher {
    registry: CommandRegistry,
    execute_only_visible: bool,
}

impl CommandDispatcher {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            registry,
            execute_only_visible: false,
        }
    }

    /// Refuse to execute handlers the context deems invisible.
    /// Suggestions are unaffected; they apply visibility on their own
    /// terms regardless of this setting.
    pub fn execute_only_visible(mut self, enabled: bool) -> Self {
        self.execute_only_visible = enabled;
        self
    }

    /// The registry this dispatcher consults. Registrations made
    /// through it are visible to dispatches already in flight.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Dispatch the context's command token.
    ///
    /// `Ok(true)` means a handler ran to completion. `Ok(false)` means
    /// nothing was dispatched: the alias is unknown, or the matched
    /// handler is invisible while visibility gating is on. Anything
    /// escaping the handler, panics included, comes back as the single
    /// execution error kind with the cause attached.
    pub fn execute(&self, ctx: &CommandContext) -> Result<bool, ScmdError> {
        let Some(handler) = self.registry.resolve(ctx.command()) else {
            debug!(command = %ctx.command(), "no handler for command");
            return Ok(false);
        };

        if self.execute_only_visible && !ctx.is_visible(handler.as_ref()) {
            debug!(command = %ctx.command(), "handler not visible to this context");
            return Ok(false);
        }

        trace!(command = %ctx.command(), "dispatching");
        match panic::catch_unwind(AssertUnwindSafe(|| handler.execute(ctx))) {
            Ok(Ok(())) => Ok(true),
            Ok(Err(source)) => {
                warn!(command = %ctx.command(), error = %source, "command failed");
                Err(ScmdError::Execution { source })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(command = %ctx.command(), panic = %message, "command panicked");
                Err(ScmdError::execution(HandlerPanic(message)))
            }
        }
    }

    /// Completion proposals for the context. Never fails; an unknown
    /// or closed-off command simply yields nothing.
    ///
    /// Empty input proposes every visible command name. A partial
    /// command token is completed against the alias table. Once the
    /// token hangs (arguments have begun), the matched handler itself
    /// answers, and only if it is visible and opted into proposals.
    pub fn suggest(&self, ctx: &CommandContext) -> HashSet<Proposal> {
        if ctx.is_completely_empty() {
            return proposal::propose_all(ctx, &self.registry.handlers());
        }
        if !ctx.is_hanging() {
            return proposal::propose_completions(ctx, &self.registry.handlers());
        }

        let Some(handler) = self.registry.resolve(ctx.command()) else {
            trace!(command = %ctx.command(), "no handler to ask for proposals");
            return HashSet::new();
        };
        if !ctx.is_visible(handler.as_ref()) {
            return HashSet::new();
        }
        match handler.as_proposal_source() {
            Some(source) => source.proposals(ctx),
            None => HashSet::new(),
        }
    }
}

/// Stand-in error carrying the payload of a panic caught during
/// dispatch.
#[derive(Debug)]
struct HandlerPanic(String);

impl fmt::Display for HandlerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler panicked: {}", self.0)
    }
}

impl Error for HandlerPanic {}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
