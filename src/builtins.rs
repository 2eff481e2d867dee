use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;
use scmd::{
    CommandContext, CommandDispatcher, CommandHandler, CommandRegistry, Config, HandlerResult,
    Proposal, ProposalSource, ScmdError,
};

/// Build the dispatcher with the built-in command set registered.
pub fn create_dispatcher(
    config: &Config,
    running: Arc<AtomicBool>,
) -> Result<CommandDispatcher, ScmdError> {
    let registry = CommandRegistry::new();
    registry.add_all([
        Arc::new(HelpCommand::new(registry.clone())) as Arc<dyn CommandHandler>,
        Arc::new(EchoCommand),
        Arc::new(VersionCommand),
        Arc::new(StatsCommand::new(registry.clone())),
        Arc::new(QuitCommand::new(running)),
    ])?;

    Ok(CommandDispatcher::new(registry).execute_only_visible(config.execute_only_visible))
}

/// Lists commands, or the aliases of one command
pub struct HelpCommand {
    registry: CommandRegistry,
}

impl HelpCommand {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }
}

impl CommandHandler for HelpCommand {
    fn aliases(&self) -> Vec<String> {
        vec!["help".to_string(), "?".to_string()]
    }

    fn execute(&self, ctx: &CommandContext) -> HandlerResult {
        match ctx.args().first() {
            Some(name) => {
                let handler = self
                    .registry
                    .resolve(name)
                    .filter(|handler| ctx.is_visible(handler.as_ref()))
                    .ok_or_else(|| format!("no help available for {:?}", name))?;
                println!("{}", style(handler.aliases().join(", ")).bold());
                Ok(())
            }
            None => {
                for handler in self.registry.handlers() {
                    if !ctx.is_visible(handler.as_ref()) {
                        continue;
                    }
                    let mut aliases = handler.aliases().into_iter();
                    if let Some(first) = aliases.next() {
                        let rest: Vec<String> = aliases.collect();
                        if rest.is_empty() {
                            println!("  {}", style(first).bold());
                        } else {
                            println!(
                                "  {}  {}",
                                style(first).bold(),
                                style(format!("({})", rest.join(", "))).dim()
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn as_proposal_source(&self) -> Option<&dyn ProposalSource> {
        Some(self)
    }
}

impl ProposalSource for HelpCommand {
    fn proposals(&self, ctx: &CommandContext) -> HashSet<Proposal> {
        // Only the first argument names a command.
        if ctx.args().len() > 1 {
            return HashSet::new();
        }
        let fragment = ctx
            .args()
            .first()
            .map(String::as_str)
            .unwrap_or("")
            .to_lowercase();

        self.registry
            .handlers()
            .into_iter()
            .filter(|handler| ctx.is_visible(handler.as_ref()))
            .filter_map(|handler| handler.aliases().into_iter().next())
            .filter(|name| name.to_lowercase().starts_with(&fragment))
            .map(|name| Proposal::new(name).replace_word())
            .collect()
    }
}

/// Prints its arguments back
pub struct EchoCommand;

impl CommandHandler for EchoCommand {
    fn aliases(&self) -> Vec<String> {
        vec!["echo".to_string(), "say".to_string()]
    }

    fn execute(&self, ctx: &CommandContext) -> HandlerResult {
        println!("{}", ctx.args().join(" "));
        Ok(())
    }
}

pub struct VersionCommand;

impl CommandHandler for VersionCommand {
    fn aliases(&self) -> Vec<String> {
        vec!["version".to_string()]
    }

    fn execute(&self, _ctx: &CommandContext) -> HandlerResult {
        println!("scmd {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}

/// Registry introspection, kept out of the visible listing
pub struct StatsCommand {
    registry: CommandRegistry,
}

impl StatsCommand {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }
}

impl CommandHandler for StatsCommand {
    fn aliases(&self) -> Vec<String> {
        vec!["stats".to_string()]
    }

    fn execute(&self, _ctx: &CommandContext) -> HandlerResult {
        let handlers = self.registry.handlers();
        let alias_count: usize = handlers.iter().map(|h| h.aliases().len()).sum();
        println!("{} commands, {} aliases", handlers.len(), alias_count);
        Ok(())
    }

    fn hidden(&self) -> bool {
        true
    }
}

/// Ends the interactive session
pub struct QuitCommand {
    running: Arc<AtomicBool>,
}

impl QuitCommand {
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self { running }
    }
}

impl CommandHandler for QuitCommand {
    fn aliases(&self) -> Vec<String> {
        vec!["quit".to_string(), "exit".to_string(), "q".to_string()]
    }

    fn execute(&self, _ctx: &CommandContext) -> HandlerResult {
        self.running.store(false, Ordering::SeqCst);
        println!("Exiting...");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn build() -> (CommandDispatcher, Arc<AtomicBool>) {
        let running = Arc::new(AtomicBool::new(true));
        let dispatcher = create_dispatcher(&Config::default(), Arc::clone(&running)).unwrap();
        (dispatcher, running)
    }

    #[test]
    fn builtin_set_registers_under_expected_aliases() {
        let (dispatcher, _running) = build();
        let registry = dispatcher.registry();
        assert_eq!(registry.len(), 5);

        for alias in ["help", "?", "echo", "say", "version", "stats", "quit", "exit", "q"] {
            assert!(registry.resolve(alias).is_some(), "missing alias {alias:?}");
        }
    }

    #[test]
    fn quit_flips_the_running_flag() {
        let (dispatcher, running) = build();
        assert!(running.load(Ordering::SeqCst));

        assert!(dispatcher.execute(&CommandContext::new("quit")).unwrap());
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn stats_is_hidden_but_runnable_by_default() {
        let (dispatcher, _running) = build();
        let stats = dispatcher.registry().resolve("stats").unwrap();
        assert!(stats.hidden());
        assert!(dispatcher.execute(&CommandContext::new("stats")).unwrap());
    }

    #[test]
    fn visibility_gate_follows_config() {
        let running = Arc::new(AtomicBool::new(true));
        let config = Config {
            execute_only_visible: true,
            ..Config::default()
        };
        let dispatcher = create_dispatcher(&config, running).unwrap();

        assert!(!dispatcher.execute(&CommandContext::new("stats")).unwrap());
        assert!(dispatcher.execute(&CommandContext::new("version")).unwrap());
    }

    #[test]
    fn help_completes_visible_command_names() {
        let (dispatcher, _running) = build();

        let ctx = CommandContext::new("help").hanging(true);
        let texts: HashSet<String> =
            dispatcher.suggest(&ctx).into_iter().map(|p| p.text).collect();
        assert!(texts.contains("echo"));
        assert!(texts.contains("version"));
        assert!(!texts.contains("stats"));

        let ctx = CommandContext::new("help")
            .hanging(true)
            .with_args(["ver".to_string()]);
        let texts: HashSet<String> =
            dispatcher.suggest(&ctx).into_iter().map(|p| p.text).collect();
        assert_eq!(texts, ["version".to_string()].into_iter().collect());
    }

    #[test]
    fn help_for_one_command_requires_it_to_exist() {
        let (dispatcher, _running) = build();

        let ctx = CommandContext::new("help").with_args(["nope".to_string()]);
        assert!(dispatcher.execute(&ctx).is_err());

        let ctx = CommandContext::new("help").with_args(["echo".to_string()]);
        assert!(dispatcher.execute(&ctx).unwrap());
    }
}
