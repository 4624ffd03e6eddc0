//! Tag a captured recording and save it into the local ledger.
//!
//! The captured file is moved into the managed recordings directory first,
//! then the tagged record is appended. A duplicate (same managed path already
//! in the ledger) is an informational notice, not an error, and leaves the
//! ledger unchanged.

use anyhow::{Context, Result, bail};
use console::style;
use std::path::{Path, PathBuf};

use crate::app;
use crate::args::SaveArgs;
use callkeep_core::{LedgerError, RecordingRecord, Settings};

pub fn run(settings: &Settings, args: SaveArgs) -> Result<()> {
    let agent_id = app::require_agent_id(settings);

    if !args.file.is_file() {
        bail!("No such audio file: {}", args.file.display());
    }

    let dest = move_into_managed_dir(&args.file, &settings.recordings_dir())?;
    let record = RecordingRecord::new(
        dest.to_string_lossy().into_owned(),
        &args.customer,
        agent_id,
        args.duration_ms,
    )?;

    let mut ledger = app::open_ledger(settings)?;
    match ledger.add(record) {
        Ok(()) => {
            println!(
                "{} Recording saved locally for customer {}.",
                style("✓").green(),
                args.customer
            );
            Ok(())
        }
        Err(LedgerError::DuplicateRejected) => {
            println!("This audio recording has already been saved locally.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Move the captured file into the managed recordings directory.
///
/// Returns the file's path inside the directory. A file already at its
/// destination is left in place (the duplicate check happens at the ledger).
fn move_into_managed_dir(source: &Path, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let file_name = source
        .file_name()
        .context("Audio file path has no file name")?;
    let dest = dir.join(file_name);
    if dest == source {
        return Ok(dest);
    }

    match std::fs::rename(source, &dest) {
        Ok(()) => Ok(dest),
        // Rename fails across filesystems; fall back to copy + remove
        Err(_) => {
            std::fs::copy(source, &dest).with_context(|| {
                format!("Failed to move {} to {}", source.display(), dest.display())
            })?;
            std::fs::remove_file(source)
                .with_context(|| format!("Failed to remove {}", source.display()))?;
            Ok(dest)
        }
    }
}
