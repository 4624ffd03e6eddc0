//! Delete selected recordings from the ledger.
//!
//! Ledger entries are removed; backing files are kept unless `--with-files`
//! is given, matching the split between record removal and file cleanup.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use std::collections::HashSet;

use crate::app;
use crate::args::DeleteArgs;
use callkeep_core::Settings;

pub fn run(settings: &Settings, args: DeleteArgs) -> Result<()> {
    let mut ledger = app::open_ledger(settings)?;

    let selection: Vec<String> = if args.all {
        ledger.records().iter().map(|r| r.id.clone()).collect()
    } else {
        app::resolve_selection(&ledger, &args.ids)?
    };

    if selection.is_empty() {
        println!("No recordings selected. Pass ids or --all.");
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {} recording(s)?", selection.len()))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    let ids: HashSet<String> = selection.into_iter().collect();
    let uris: Vec<String> = ledger
        .records()
        .iter()
        .filter(|record| ids.contains(&record.id))
        .map(|record| record.uri.clone())
        .collect();

    let removed = ledger.remove(&ids)?;

    if args.with_files {
        for uri in uris {
            if let Err(e) = std::fs::remove_file(&uri) {
                eprintln!("Warning: could not delete {uri}: {e}");
            }
        }
    }

    println!("{} Deleted {removed} recording(s).", style("✓").green());
    Ok(())
}
