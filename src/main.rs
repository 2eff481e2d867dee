mod app;
mod builtins;
mod cli;
mod display;
mod input;

use clap::Parser;
use scmd::{Config, ScmdError};
use tracing_subscriber::EnvFilter;

use crate::app::Application;
use crate::cli::Args;

fn main() -> Result<(), ScmdError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let exit = Application::new(args, config)?.run()?;
    std::process::exit(exit);
}
