use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Command line to run non-interactively, e.g. "echo hello"
    pub command: Option<String>,

    /// Print completion proposals for the given input instead of running it
    #[arg(short, long, value_name = "TEXT")]
    pub suggest: Option<String>,

    /// Path to the config file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat hidden commands as visible
    #[arg(long)]
    pub show_hidden: bool,
}
