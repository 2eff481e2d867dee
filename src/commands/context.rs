use std::fmt;
use std::sync::Arc;

use crate::commands::handler::CommandHandler;

/// Caller-supplied rule deciding whether a handler takes part in
/// suggestion and execution for one invocation.
pub type VisibilityPredicate = dyn Fn(&dyn CommandHandler) -> bool + Send + Sync;

/// One textual invocation, as produced by an upstream tokenizer.
///
/// A context is immutable for the duration of a dispatch call. It
/// carries the raw command token, whether the input hangs mid-argument
/// (so completions should come from the matched handler rather than
/// from command names), and whether there was no input at all. Argument
/// tokens are carried opaquely for handlers that want them; the
/// dispatch core itself never inspects them.
#[derive(Clone)]
pub struct CommandContext {
    command: String,
    args: Vec<String>,
    hanging: bool,
    completely_empty: bool,
    visibility: Option<Arc<VisibilityPredicate>>,
}

impl CommandContext {
    /// Context for a typed command token.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            hanging: false,
            completely_empty: false,
            visibility: None,
        }
    }

    /// Context for input with no text at all.
    pub fn empty() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            hanging: false,
            completely_empty: true,
            visibility: None,
        }
    }

    /// Mark the input as hanging mid-argument.
    pub fn hanging(mut self, hanging: bool) -> Self {
        self.hanging = hanging;
        self
    }

    /// Attach pre-tokenized argument strings for the handler's use.
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.args = args.into_iter().collect();
        self
    }

    /// Install a visibility predicate. Without one, a handler is
    /// visible unless it reports itself hidden.
    pub fn with_visibility(mut self, predicate: Arc<VisibilityPredicate>) -> Self {
        self.visibility = Some(predicate);
        self
    }

    /// The raw command token as typed.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Argument tokens following the command, opaque to the core.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_hanging(&self) -> bool {
        self.hanging
    }

    pub fn is_completely_empty(&self) -> bool {
        self.completely_empty
    }

    /// Apply this context's visibility rule to a handler.
    pub fn is_visible(&self, handler: &dyn CommandHandler) -> bool {
        match &self.visibility {
            Some(predicate) => predicate(handler),
            None => !handler.hidden(),
        }
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("hanging", &self.hanging)
            .field("completely_empty", &self.completely_empty)
            .field("visibility", &self.visibility.as_ref().map(|_| ".."))
            .finish()
    }
}
