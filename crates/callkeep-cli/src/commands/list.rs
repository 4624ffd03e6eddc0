//! List locally saved recordings.

use anyhow::Result;
use console::style;

use crate::app;
use callkeep_core::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let ledger = app::open_ledger(settings)?;

    if ledger.is_empty() {
        println!("No local recordings found.");
        println!("Record audio and run `callkeep save` to store a tagged call.");
        return Ok(());
    }

    println!(
        "{:<10} {:<16} {:<10} {:<10} {:<26} STATUS",
        "ID", "CUSTOMER", "AGENT", "DURATION", "RECORDED"
    );
    for record in ledger.records() {
        let status = if record.uploaded {
            style("Uploaded").green()
        } else {
            style("Local").yellow()
        };
        println!(
            "{:<10} {:<16} {:<10} {:<10} {:<26} {}",
            app::short_id(&record.id),
            record.customer_number,
            record.agent_id,
            record.duration,
            record.timestamp,
            status
        );
    }
    println!("\n{} recording(s).", ledger.len());
    Ok(())
}
