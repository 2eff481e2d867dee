use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandHandler, HandlerResult, ProposalSource};
use crate::commands::proposal::Proposal;

/// Scriptable handler for unit tests. Counts invocations and can be
/// told to fail, panic, hide itself, or serve hanging proposals.
pub(crate) struct MockCommand {
    aliases: Vec<String>,
    hidden: bool,
    fail_with: Option<String>,
    panic_with: Option<String>,
    hanging_proposals: Option<HashSet<Proposal>>,
    calls: AtomicUsize,
}

impl MockCommand {
    pub(crate) fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            hidden: false,
            fail_with: None,
            panic_with: None,
            hanging_proposals: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub(crate) fn fails_with(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    pub(crate) fn panics_with(mut self, message: impl Into<String>) -> Self {
        self.panic_with = Some(message.into());
        self
    }

    pub(crate) fn with_hanging_proposals<I>(mut self, proposals: I) -> Self
    where
        I: IntoIterator<Item = Proposal>,
    {
        self.hanging_proposals = Some(proposals.into_iter().collect());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommandHandler for MockCommand {
    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    fn execute(&self, _ctx: &CommandContext) -> HandlerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.panic_with {
            panic!("{message}");
        }
        if let Some(message) = &self.fail_with {
            return Err(Box::new(MockFailure(message.clone())));
        }
        Ok(())
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn as_proposal_source(&self) -> Option<&dyn ProposalSource> {
        self.hanging_proposals.as_ref().map(|_| self as &dyn ProposalSource)
    }
}

impl ProposalSource for MockCommand {
    fn proposals(&self, _ctx: &CommandContext) -> HashSet<Proposal> {
        self.hanging_proposals.clone().unwrap_or_default()
    }
}

/// Error shape returned by failing mocks, kept distinct so tests can
/// downcast through the dispatcher's wrapping.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MockFailure(pub(crate) String);

impl fmt::Display for MockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for MockFailure {}
