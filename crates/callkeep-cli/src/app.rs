//! Shared helpers for loading settings and resolving record selections.

use anyhow::Result;
use callkeep_core::{Ledger, LedgerError, Settings};

/// Open the ledger, with actionable guidance on failure.
///
/// A corrupt blob is reported and left on disk; we never silently discard it.
pub fn open_ledger(settings: &Settings) -> Result<Ledger> {
    match Ledger::open(settings.ledger_path()) {
        Ok(ledger) => Ok(ledger),
        Err(e @ LedgerError::Persistence(_)) => {
            eprintln!("Error: {e}");
            eprintln!(
                "\nThe ledger file at {} could not be loaded.",
                settings.ledger_path().display()
            );
            eprintln!("Inspect or move it aside before retrying; it has not been modified.");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Agent id from settings, exiting with guidance when not configured.
pub fn require_agent_id(settings: &Settings) -> String {
    match &settings.agent_id {
        Some(agent_id) => agent_id.clone(),
        None => {
            eprintln!("Error: No agent id configured.");
            eprintln!("\nSet it with:");
            eprintln!("  callkeep config --agent-id YOUR_AGENT_ID\n");
            std::process::exit(1);
        }
    }
}

/// Resolve user-supplied ids (full ids or unique prefixes) against the ledger.
///
/// Unknown or ambiguous inputs are errors; selection order follows the
/// user's argument order.
pub fn resolve_selection(ledger: &Ledger, inputs: &[String]) -> Result<Vec<String>> {
    let mut selection = Vec::new();
    for input in inputs {
        let matches: Vec<&str> = ledger
            .records()
            .iter()
            .filter(|record| record.id.starts_with(input.as_str()))
            .map(|record| record.id.as_str())
            .collect();
        match matches.as_slice() {
            [] => anyhow::bail!("No recording matches id '{input}'"),
            [id] => selection.push(id.to_string()),
            _ => anyhow::bail!(
                "Id '{input}' is ambiguous ({} matches); use a longer prefix",
                matches.len()
            ),
        }
    }
    Ok(selection)
}

/// Short display form of a record id.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}
