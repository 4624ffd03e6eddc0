pub mod config;
pub mod credentials;
pub mod gateway;
pub mod ledger;
pub mod reconcile;
pub mod record;
pub mod session;
pub mod settings;
pub mod verbose;

pub use config::{ApiConfig, DEFAULT_TIMEOUT_SECS};
pub use credentials::CredentialStore;
pub use gateway::{HttpUploadGateway, UploadGateway, login};
pub use ledger::{Ledger, LedgerError};
pub use reconcile::{BatchSummary, CancelFlag, FailedUpload, PurgeReport, purge_uploaded, run_batch};
pub use record::{RecordingRecord, format_duration};
pub use session::{CaptureState, PlaybackState, PlaybackStatus, SessionError};
pub use settings::Settings;
pub use verbose::set_verbose;
