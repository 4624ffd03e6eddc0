//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "callkeep", version, about = "Tag, store, and upload field call recordings")]
pub struct Cli {
    /// Print verbose diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the upload token
    Login,
    /// Remove the stored upload token
    Logout,
    /// Tag a captured recording and save it to the local ledger
    Save(SaveArgs),
    /// List locally saved recordings
    List,
    /// Upload selected recordings to the backend
    Upload(UploadArgs),
    /// Delete selected recordings from the ledger
    Delete(DeleteArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct SaveArgs {
    /// Path of the captured audio file (moved into the managed directory)
    #[arg(long)]
    pub file: PathBuf,

    /// Customer number to tag the recording with
    #[arg(long)]
    pub customer: String,

    /// Measured call duration in milliseconds
    #[arg(long, default_value_t = 0)]
    pub duration_ms: u64,
}

#[derive(Args)]
pub struct UploadArgs {
    /// Record ids (or unique id prefixes) to upload
    pub ids: Vec<String>,

    /// Upload every recording in the ledger
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Skip the upload confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// After a successful batch, delete uploaded local files without asking
    #[arg(long, conflicts_with = "keep_local")]
    pub purge: bool,

    /// After a successful batch, keep local files without asking
    #[arg(long)]
    pub keep_local: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Record ids (or unique id prefixes) to delete
    pub ids: Vec<String>,

    /// Delete every recording in the ledger
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Also delete the backing audio files
    #[arg(long)]
    pub with_files: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Agent identifier attached to saved recordings
    #[arg(long)]
    pub agent_id: Option<String>,

    /// Base URL of the recordings backend
    #[arg(long)]
    pub base_url: Option<String>,

    /// Base URL of the auth backend (defaults to the recordings base URL)
    #[arg(long)]
    pub auth_url: Option<String>,

    /// Request timeout in seconds for upload and login calls
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
