use std::collections::HashSet;
use std::error::Error;

use console::style;
use scmd::{Priority, Proposal, ScmdError};

/// Order proposals for presentation: direct continuations first, then
/// alphabetically.
pub(crate) fn ranked(proposals: HashSet<Proposal>) -> Vec<Proposal> {
    let mut proposals: Vec<Proposal> = proposals.into_iter().collect();
    proposals.sort_by_key(|p| (p.priority == Priority::LongShot, p.text.clone()));
    proposals
}

/// Display proposals as a styled list, strongest matches first
pub fn print_proposals(proposals: HashSet<Proposal>) {
    if proposals.is_empty() {
        println!("{}", style("No suggestions").dim());
        return;
    }

    for proposal in ranked(proposals) {
        match proposal.priority {
            Priority::Normal => println!("{}", style(&proposal.text).bold()),
            Priority::LongShot => println!(
                "{} {}",
                style(&proposal.text).dim(),
                style("(long shot)").dim().italic()
            ),
        }
    }
}

/// Emit proposals as JSON lines for non-interactive callers
pub fn print_proposals_json(proposals: HashSet<Proposal>) -> Result<(), ScmdError> {
    for proposal in ranked(proposals) {
        println!("{}", serde_json::to_string(&proposal)?);
    }
    Ok(())
}

pub fn print_not_found(command: &str) {
    println!(
        "{} {}",
        style("❌").bold().red(),
        style(format!("Unknown command: {}", command)).bold().red()
    );
}

/// Suggest near matches after a failed lookup
pub fn print_hint(command: &str, proposals: &HashSet<Proposal>) {
    let mut names: Vec<String> = proposals
        .iter()
        .map(|p| {
            if p.replace_word {
                p.text.clone()
            } else {
                format!("{}{}", command, p.text)
            }
        })
        .collect();
    names.sort();
    names.dedup();

    if names.is_empty() {
        return;
    }
    println!(
        "{} {}",
        style("💡").bold().yellow(),
        style(format!("Did you mean: {}?", names.join(", "))).cyan()
    );
}

/// Display an error and the chain of causes behind it
pub fn print_error(err: &ScmdError) {
    eprintln!("{} {}", style("❌").bold().red(), style(err).bold().red());

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", style("caused by:").dim(), cause);
        source = cause.source();
    }
}

/// Greeting shown when the interactive shell starts
pub fn print_banner(command_count: usize) {
    println!(
        "{} {}",
        style("scmd").bold().magenta(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!(
        "{}",
        style(format!(
            "{} commands loaded. Type 'help' to list them, Tab to complete.",
            command_count
        ))
        .dim()
    );
}
