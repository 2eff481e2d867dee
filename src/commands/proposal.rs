use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;

/// How strongly a proposal continues what the user typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Direct continuation of the typed text.
    #[default]
    Normal,
    /// Fuzzier guess, such as a substring hit somewhere in an alias.
    LongShot,
}

/// One completion candidate.
///
/// `text` is either a suffix to append after the typed word or, when
/// `replace_word` is set, a full replacement for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proposal {
    pub text: String,
    #[serde(default)]
    pub replace_word: bool,
    #[serde(default)]
    pub priority: Priority,
}

impl Proposal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            replace_word: false,
            priority: Priority::Normal,
        }
    }

    /// Mark this proposal as replacing the typed word rather than
    /// extending it.
    pub fn replace_word(mut self) -> Self {
        self.replace_word = true;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Proposals for input with no text at all: the primary alias of every
/// visible handler.
pub(crate) fn propose_all(
    ctx: &CommandContext,
    handlers: &[Arc<dyn CommandHandler>],
) -> HashSet<Proposal> {
    handlers
        .iter()
        .filter(|handler| ctx.is_visible(handler.as_ref()))
        .filter_map(|handler| handler.aliases().into_iter().next())
        .map(Proposal::new)
        .collect()
}

/// Proposals for a partially typed command token.
///
/// Each visible handler contributes at most one proposal, decided by
/// the first of its aliases that relates to the typed text: an exact
/// match means the name is already complete and yields nothing, a
/// prefix match yields the rest of that alias, and a substring match
/// (only for two or more typed characters) yields the whole alias as a
/// long-shot replacement.
pub(crate) fn propose_completions(
    ctx: &CommandContext,
    handlers: &[Arc<dyn CommandHandler>],
) -> HashSet<Proposal> {
    let test = ctx.command();
    let test_lower = test.to_lowercase();
    let allow_long_shots = test.chars().count() >= 2;
    let mut proposals = HashSet::new();

    'handlers: for handler in handlers {
        if !ctx.is_visible(handler.as_ref()) {
            continue;
        }
        for alias in handler.aliases() {
            match strip_prefix_ignore_case(&alias, test) {
                Some("") => continue 'handlers,
                Some(rest) => {
                    proposals.insert(Proposal::new(rest));
                    continue 'handlers;
                }
                None => {}
            }
            if allow_long_shots && alias.to_lowercase().contains(&test_lower) {
                proposals.insert(Proposal::new(alias).replace_word().priority(Priority::LongShot));
                continue 'handlers;
            }
        }
    }

    proposals
}

/// Case-insensitive prefix strip that keeps the alias's own casing in
/// the returned remainder. Compares one character at a time so that
/// multi-byte characters never split a slice.
fn strip_prefix_ignore_case<'a>(alias: &'a str, test: &str) -> Option<&'a str> {
    let mut alias_chars = alias.char_indices();
    for test_char in test.chars() {
        match alias_chars.next() {
            Some((_, alias_char)) if chars_eq_ignore_case(alias_char, test_char) => {}
            _ => return None,
        }
    }
    match alias_chars.next() {
        Some((rest_start, _)) => Some(&alias[rest_start..]),
        None => Some(""),
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
