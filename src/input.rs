use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::{self, MatchingBracketValidator, Validator};
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use scmd::{
    CommandContext, CommandDispatcher, Config, Priority, Proposal, ScmdError, VisibilityPredicate,
};

use crate::display::ranked;

/// Turn one line of raw input into a dispatch context.
///
/// The first whitespace-delimited token is the command. Anything after
/// it, even just a trailing space, marks the input as hanging and is
/// carried as argument tokens.
pub fn context_for_line(line: &str, visibility: Option<Arc<VisibilityPredicate>>) -> CommandContext {
    let text = line.trim_start();
    let ctx = if text.is_empty() {
        CommandContext::empty()
    } else {
        match text.split_once(char::is_whitespace) {
            Some((command, rest)) => CommandContext::new(command)
                .hanging(true)
                .with_args(rest.split_whitespace().map(str::to_string)),
            None => CommandContext::new(text),
        }
    };
    match visibility {
        Some(predicate) => ctx.with_visibility(predicate),
        None => ctx,
    }
}

/// Byte offset where the word under the cursor begins.
fn fragment_start(typed: &str) -> usize {
    typed
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0)
}

/// Map proposals onto rustyline candidates, anchored at the byte
/// offset rustyline should replace from.
fn completion_candidates(
    typed: &str,
    ctx: &CommandContext,
    proposals: Vec<Proposal>,
) -> (usize, Vec<Pair>) {
    if ctx.is_completely_empty() {
        let pairs = proposals
            .into_iter()
            .map(|p| Pair {
                display: p.text.clone(),
                replacement: p.text,
            })
            .collect();
        return (typed.len(), pairs);
    }

    if ctx.is_hanging() {
        let start = fragment_start(typed);
        let fragment = &typed[start..];
        let pairs = proposals
            .into_iter()
            .map(|p| {
                let replacement = if p.replace_word {
                    p.text.clone()
                } else {
                    format!("{}{}", fragment, p.text)
                };
                Pair {
                    display: p.text,
                    replacement,
                }
            })
            .collect();
        return (start, pairs);
    }

    let start = typed.len() - typed.trim_start().len();
    let pairs = proposals
        .into_iter()
        .map(|p| {
            let replacement = if p.replace_word {
                p.text.clone()
            } else {
                format!("{}{}", ctx.command(), p.text)
            };
            Pair {
                display: replacement.clone(),
                replacement,
            }
        })
        .collect();
    (start, pairs)
}

/// Completer backed by the command dispatcher
pub struct ShellCompleter {
    dispatcher: CommandDispatcher,
    visibility: Option<Arc<VisibilityPredicate>>,
}

impl ShellCompleter {
    pub fn new(dispatcher: CommandDispatcher, visibility: Option<Arc<VisibilityPredicate>>) -> Self {
        Self {
            dispatcher,
            visibility,
        }
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        let ctx = context_for_line(typed, self.visibility.clone());
        let proposals = ranked(self.dispatcher.suggest(&ctx));
        Ok(completion_candidates(typed, &ctx, proposals))
    }
}

/// Custom highlighter for bracket matching
pub struct ShellHighlighter {
    bracket_highlighter: MatchingBracketHighlighter,
}

impl ShellHighlighter {
    pub fn new() -> Self {
        Self {
            bracket_highlighter: MatchingBracketHighlighter::new(),
        }
    }
}

impl Highlighter for ShellHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.bracket_highlighter.highlight(line, pos)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }

    fn highlight_candidate<'c>(
        &self,
        candidate: &'c str,
        completion: rustyline::CompletionType,
    ) -> Cow<'c, str> {
        self.bracket_highlighter
            .highlight_candidate(candidate, completion)
    }
}

/// Hinter that shows the unique command continuation, falling back to
/// history
pub struct ShellHinter {
    dispatcher: CommandDispatcher,
    visibility: Option<Arc<VisibilityPredicate>>,
    history_hinter: HistoryHinter,
}

impl ShellHinter {
    pub fn new(dispatcher: CommandDispatcher, visibility: Option<Arc<VisibilityPredicate>>) -> Self {
        Self {
            dispatcher,
            visibility,
            history_hinter: HistoryHinter {},
        }
    }

    /// Inline hint when exactly one command continues the typed text.
    fn command_hint(&self, line: &str) -> Option<String> {
        let ctx = context_for_line(line, self.visibility.clone());
        if ctx.is_completely_empty() || ctx.is_hanging() {
            return None;
        }

        let mut suffixes: Vec<String> = self
            .dispatcher
            .suggest(&ctx)
            .into_iter()
            .filter(|p| !p.replace_word && p.priority == Priority::Normal)
            .map(|p| p.text)
            .collect();
        suffixes.sort();
        suffixes.dedup();

        match suffixes.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }
}

impl Hinter for ShellHinter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        if pos == line.len() {
            if let Some(hint) = self.command_hint(line) {
                return Some(hint);
            }
        }
        self.history_hinter.hint(line, pos, ctx)
    }
}

/// Custom validator for input validation
pub struct ShellValidator {
    bracket_validator: MatchingBracketValidator,
}

impl ShellValidator {
    pub fn new() -> Self {
        Self {
            bracket_validator: MatchingBracketValidator::new(),
        }
    }
}

impl Validator for ShellValidator {
    fn validate(
        &self,
        ctx: &mut validate::ValidationContext,
    ) -> rustyline::Result<validate::ValidationResult> {
        self.bracket_validator.validate(ctx)
    }

    fn validate_while_typing(&self) -> bool {
        self.bracket_validator.validate_while_typing()
    }
}

/// Helper struct that combines all rustyline components
pub struct ShellHelper {
    completer: ShellCompleter,
    highlighter: ShellHighlighter,
    hinter: ShellHinter,
    validator: ShellValidator,
}

impl ShellHelper {
    pub fn new(dispatcher: CommandDispatcher, visibility: Option<Arc<VisibilityPredicate>>) -> Self {
        Self {
            completer: ShellCompleter::new(dispatcher.clone(), visibility.clone()),
            highlighter: ShellHighlighter::new(),
            hinter: ShellHinter::new(dispatcher, visibility),
            validator: ShellValidator::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        self.highlighter.highlight_hint(hint)
    }

    fn highlight_candidate<'c>(
        &self,
        candidate: &'c str,
        completion: rustyline::CompletionType,
    ) -> Cow<'c, str> {
        self.highlighter.highlight_candidate(candidate, completion)
    }
}

impl Validator for ShellHelper {
    fn validate(
        &self,
        ctx: &mut validate::ValidationContext,
    ) -> rustyline::Result<validate::ValidationResult> {
        self.validator.validate(ctx)
    }

    fn validate_while_typing(&self) -> bool {
        self.validator.validate_while_typing()
    }
}

/// Creates a configured rustyline editor
pub fn create_editor(
    dispatcher: CommandDispatcher,
    visibility: Option<Arc<VisibilityPredicate>>,
    config: &Config,
) -> Result<Editor<ShellHelper, FileHistory>, ScmdError> {
    let editor_config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(editor_config)
        .map_err(|e| ScmdError::Input(format!("Failed to create line editor: {}", e)))?;

    editor.set_helper(Some(ShellHelper::new(dispatcher, visibility)));

    let _ = editor.load_history(&config.history_path());

    Ok(editor)
}

/// Reads a line of input using rustyline
pub fn read_input(
    editor: &mut Editor<ShellHelper, FileHistory>,
    prompt: &str,
) -> Result<Option<String>, ScmdError> {
    let prompt = if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        prompt.to_string()
    } else {
        style(prompt).bold().cyan().to_string()
    };
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                if let Err(e) = editor.add_history_entry(&line) {
                    return Err(ScmdError::Input(format!(
                        "Failed to add history entry: {}",
                        e
                    )));
                }
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) => {
            // Ctrl-C pressed
            println!("Exiting...");
            Ok(None)
        }
        Err(ReadlineError::Eof) => {
            // Ctrl-D pressed
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(ScmdError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history
pub fn save_history(
    editor: &mut Editor<ShellHelper, FileHistory>,
    path: &Path,
) -> Result<(), ScmdError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ScmdError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(path)
        .map_err(|e| ScmdError::Input(format!("Failed to save history: {}", e)))
}
