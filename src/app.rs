use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use is_terminal::IsTerminal;
use scmd::{CommandDispatcher, CommandHandler, Config, ScmdError, VisibilityPredicate};

use crate::builtins;
use crate::cli::Args;
use crate::display;
use crate::input;

pub struct Application {
    pub args: Args,
    pub config: Config,
    dispatcher: CommandDispatcher,
    running: Arc<AtomicBool>,
    visibility: Option<Arc<VisibilityPredicate>>,
}

impl Application {
    pub fn new(args: Args, config: Config) -> Result<Self, ScmdError> {
        let running = Arc::new(AtomicBool::new(true));
        let dispatcher = builtins::create_dispatcher(&config, Arc::clone(&running))?;
        let visibility = visibility_for(&args, &config);

        Ok(Self {
            args,
            config,
            dispatcher,
            running,
            visibility,
        })
    }

    /// Pick a mode from the arguments and run it, returning the
    /// process exit code.
    pub fn run(&self) -> Result<i32, ScmdError> {
        if let Some(text) = self.args.suggest.clone() {
            return self.run_suggest(&text);
        }
        if let Some(line) = self.args.command.clone() {
            return self.run_once(&line);
        }
        if !io::stdin().is_terminal() {
            return self.run_piped();
        }
        self.run_shell()
    }

    /// One-shot completion query. Styled for a terminal, JSON lines
    /// for a pipe.
    fn run_suggest(&self, text: &str) -> Result<i32, ScmdError> {
        let ctx = input::context_for_line(text, self.visibility.clone());
        let proposals = self.dispatcher.suggest(&ctx);

        if io::stdout().is_terminal() {
            display::print_proposals(proposals);
        } else {
            display::print_proposals_json(proposals)?;
        }
        Ok(0)
    }

    fn run_once(&self, line: &str) -> Result<i32, ScmdError> {
        let ctx = input::context_for_line(line, self.visibility.clone());
        if ctx.is_completely_empty() {
            return Err(ScmdError::Input("No command provided".to_string()));
        }

        match self.dispatcher.execute(&ctx) {
            Ok(true) => Ok(0),
            Ok(false) => {
                let probe = input::context_for_line(ctx.command(), self.visibility.clone());
                display::print_not_found(ctx.command());
                display::print_hint(ctx.command(), &self.dispatcher.suggest(&probe));
                Ok(1)
            }
            Err(err) => {
                display::print_error(&err);
                Ok(2)
            }
        }
    }

    /// Script mode: run every non-blank line from stdin, stopping at
    /// the first failure.
    fn run_piped(&self) -> Result<i32, ScmdError> {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| ScmdError::Input(format!("Failed to read from stdin: {}", e)))?;

        for line in buffer.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let code = self.run_once(line)?;
            if code != 0 {
                return Ok(code);
            }
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
        }
        Ok(0)
    }

    fn run_shell(&self) -> Result<i32, ScmdError> {
        display::print_banner(self.dispatcher.registry().len());

        let mut editor = input::create_editor(
            self.dispatcher.clone(),
            self.visibility.clone(),
            &self.config,
        )?;

        while self.running.load(Ordering::SeqCst) {
            let line = match input::read_input(&mut editor, &self.config.prompt)? {
                Some(line) => line,
                None => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            let ctx = input::context_for_line(&line, self.visibility.clone());
            match self.dispatcher.execute(&ctx) {
                Ok(true) => {}
                Ok(false) => {
                    let probe = input::context_for_line(ctx.command(), self.visibility.clone());
                    display::print_not_found(ctx.command());
                    display::print_hint(ctx.command(), &self.dispatcher.suggest(&probe));
                }
                Err(err) => display::print_error(&err),
            }
        }

        input::save_history(&mut editor, &self.config.history_path())?;
        Ok(0)
    }
}

/// Hidden commands become visible when either the flag or the config
/// asks for it.
fn visibility_for(args: &Args, config: &Config) -> Option<Arc<VisibilityPredicate>> {
    if args.show_hidden || config.show_hidden {
        Some(Arc::new(|_: &dyn CommandHandler| true))
    } else {
        None
    }
}
