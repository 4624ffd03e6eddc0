//! Batch upload selected recordings, then offer local cleanup.
//!
//! Mirrors the reconciliation protocol: confirm, sequential batch with
//! cooperative Ctrl-C cancellation, summary, then the keep-local /
//! delete-uploaded-files decision for the succeeded subset.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use crate::app;
use crate::args::UploadArgs;
use callkeep_core::{
    CancelFlag, CredentialStore, HttpUploadGateway, Settings, purge_uploaded, run_batch,
};

pub async fn run(settings: &Settings, args: UploadArgs) -> Result<()> {
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
            .with_prompt(format!("Upload {} recording(s)?", selection.len()))
            .default(true)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    let gateway = HttpUploadGateway::new(&settings.api)?;
    let credentials = CredentialStore::new();

    // Ctrl-C raises the cancellation flag; the item in flight still completes
    // and the batch persists what it got through.
    let cancel = CancelFlag::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current upload...");
            cancel_on_signal.cancel();
        }
    });

    let summary = run_batch(&mut ledger, selection, &gateway, &credentials, &cancel).await?;
    println!("\n{}", summary.describe());

    if summary.succeeded.is_empty() {
        return Ok(());
    }

    let delete_local = if args.purge {
        true
    } else if args.keep_local {
        false
    } else {
        Confirm::new()
            .with_prompt(format!(
                "Delete the {} uploaded local file(s)?",
                summary.succeeded.len()
            ))
            .default(false)
            .interact()?
    };

    if delete_local {
        let report = purge_uploaded(&mut ledger, &summary.succeeded)?;
        println!(
            "{} Removed {} record(s) and deleted their local files.",
            style("✓").green(),
            report.removed
        );
        for (uri, error) in &report.file_errors {
            eprintln!("Warning: could not delete {uri}: {error}");
        }
    } else {
        println!("Keeping local copies.");
    }

    Ok(())
}
