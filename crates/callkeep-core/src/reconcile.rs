//! Batch reconciliation: sync selected ledger records with the backend.
//!
//! Uploads are sequential, in selection order, one awaited at a time. Each
//! item succeeds or fails independently; a failure never aborts the rest of
//! the batch. Per-item uploaded flags are applied to the in-memory ledger
//! snapshot and persisted once at the end of the batch.
//!
//! The end-of-batch persist is last-writer-wins: a second writer mutating the
//! ledger mid-batch will be overwritten. Accepted limitation for a
//! single-user, per-device store.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::credentials::CredentialStore;
use crate::gateway::UploadGateway;
use crate::ledger::{Ledger, LedgerError};

/// Cooperative cancellation for long-running batches.
///
/// Checked at the top of every loop iteration; the item in flight when the
/// flag is raised still completes and is accounted for.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One upload that did not go through.
#[derive(Debug, Clone)]
pub struct FailedUpload {
    pub id: String,
    pub customer_number: String,
    pub error: String,
}

/// Outcome of one reconciliation batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Ids marked uploaded during this batch, in processing order
    pub succeeded: Vec<String>,
    /// Per-item failures; these records stay eligible for a later batch
    pub failed: Vec<FailedUpload>,
    /// Ids skipped because they no longer resolve or were already uploaded
    pub skipped: usize,
    /// Whether the batch stopped early on the cancellation flag
    pub cancelled: bool,
}

impl BatchSummary {
    /// Human-readable summary with per-failure detail.
    pub fn describe(&self) -> String {
        let mut message = format!(
            "Successful uploads: {}\nFailed uploads: {}",
            self.succeeded.len(),
            self.failed.len()
        );
        if self.skipped > 0 {
            message.push_str(&format!("\nSkipped: {}", self.skipped));
        }
        if self.cancelled {
            message.push_str("\nBatch cancelled before completion.");
        }
        if !self.failed.is_empty() {
            message.push_str("\n\nFailed details:");
            for fail in &self.failed {
                let who = if fail.customer_number.is_empty() {
                    &fail.id
                } else {
                    &fail.customer_number
                };
                message.push_str(&format!("\n- {}: {}", who, fail.error));
            }
        }
        message
    }
}

/// Run one reconciliation batch over `selection`.
///
/// The selection is consumed by the call (cleared, per the selection
/// lifecycle). The bearer token is re-read from the credential store before
/// every upload; an absent token is a per-item failure, not an abort. The
/// updated snapshot is persisted in one write after the loop, whether 0,
/// some, or all items succeeded.
pub async fn run_batch(
    ledger: &mut Ledger,
    selection: Vec<String>,
    gateway: &dyn UploadGateway,
    credentials: &CredentialStore,
    cancel: &CancelFlag,
) -> Result<BatchSummary, LedgerError> {
    let mut summary = BatchSummary::default();

    for id in selection {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        // Snapshot lookup; stale or already-uploaded ids are an idempotent no-op
        let Some(record) = ledger.get(&id).cloned() else {
            crate::verbose!("Skipping {id}: not in ledger");
            summary.skipped += 1;
            continue;
        };
        if record.uploaded {
            crate::verbose!("Skipping {id}: already uploaded");
            summary.skipped += 1;
            continue;
        }

        let Some(token) = credentials.token() else {
            summary.failed.push(FailedUpload {
                id,
                customer_number: record.customer_number,
                error: "Authentication token not found. Please log in.".to_string(),
            });
            continue;
        };

        crate::verbose!(
            "Uploading {} for customer {}",
            record.id,
            record.customer_number
        );
        match gateway.upload(&record, &token).await {
            Ok(_) => {
                ledger.flag_uploaded(&id);
                summary.succeeded.push(id);
            }
            Err(e) => {
                summary.failed.push(FailedUpload {
                    id,
                    customer_number: record.customer_number,
                    error: format!("{e:#}"),
                });
            }
        }
    }

    ledger.persist()?;
    Ok(summary)
}

/// Outcome of the post-batch local cleanup.
#[derive(Debug, Default)]
pub struct PurgeReport {
    /// Records removed from the ledger
    pub removed: usize,
    /// Backing files that could not be deleted: (uri, error)
    pub file_errors: Vec<(String, String)>,
}

/// Remove successfully uploaded records and best-effort delete their files.
///
/// The ledger removal is the authoritative step and happens first; file
/// deletion failures are collected and logged, never escalated, and never
/// roll back the removal.
pub fn purge_uploaded(
    ledger: &mut Ledger,
    succeeded: &[String],
) -> Result<PurgeReport, LedgerError> {
    let ids: HashSet<String> = succeeded.iter().cloned().collect();
    let uris: Vec<String> = ledger
        .records()
        .iter()
        .filter(|record| ids.contains(&record.id))
        .map(|record| record.uri.clone())
        .collect();

    let mut report = PurgeReport {
        removed: ledger.remove(&ids)?,
        ..Default::default()
    };

    for uri in uris {
        if let Err(e) = std::fs::remove_file(&uri) {
            crate::verbose!("Failed to delete {uri}: {e}");
            report.file_errors.push((uri, e.to_string()));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::UploadGateway;
    use crate::record::RecordingRecord;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    /// Gateway stub that fails for a configured set of customer numbers.
    struct StubGateway {
        fail_customers: HashSet<String>,
    }

    impl StubGateway {
        fn always_succeed() -> Self {
            Self {
                fail_customers: HashSet::new(),
            }
        }

        fn failing_for(customers: &[&str]) -> Self {
            Self {
                fail_customers: customers.iter().map(|c| c.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl UploadGateway for StubGateway {
        async fn upload(
            &self,
            record: &RecordingRecord,
            _token: &str,
        ) -> Result<serde_json::Value> {
            if self.fail_customers.contains(&record.customer_number) {
                anyhow::bail!("server rejected recording");
            }
            Ok(serde_json::json!({ "status": "ok" }))
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        blob: PathBuf,
        ledger: Ledger,
        credentials: CredentialStore,
        ids: Vec<String>,
    }

    fn fixture(count: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("recordings.json");
        let mut ledger = Ledger::open(&blob).unwrap();
        let mut ids = Vec::new();
        for i in 0..count {
            let file = dir.path().join(format!("call{i}.m4a"));
            std::fs::write(&file, b"audio").unwrap();
            let record =
                RecordingRecord::new(file.to_str().unwrap(), &format!("C-{i}"), "agent-1", 1000)
                    .unwrap();
            ids.push(record.id.clone());
            ledger.add(record).unwrap();
        }
        let credentials = CredentialStore::at(dir.path().join("token"));
        credentials.store("test-token").unwrap();
        Fixture {
            _dir: dir,
            blob,
            ledger,
            credentials,
            ids,
        }
    }

    #[tokio::test]
    async fn test_all_success_marks_every_record() {
        let mut fx = fixture(3);
        let gateway = StubGateway::always_succeed();

        let summary = run_batch(
            &mut fx.ledger,
            fx.ids.clone(),
            &gateway,
            &fx.credentials,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.succeeded.len(), 3);
        assert!(summary.failed.is_empty());
        assert!(fx.ledger.records().iter().all(|r| r.uploaded));

        // Persisted once at the end of the batch
        let reloaded = Ledger::open(&fx.blob).unwrap();
        assert!(reloaded.records().iter().all(|r| r.uploaded));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let mut fx = fixture(3);
        let gateway = StubGateway::failing_for(&["C-1"]);

        let summary = run_batch(
            &mut fx.ledger,
            fx.ids.clone(),
            &gateway,
            &fx.credentials,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.succeeded, vec![fx.ids[0].clone(), fx.ids[2].clone()]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].customer_number, "C-1");
        assert!(summary.failed[0].error.contains("server rejected"));

        let failed = fx.ledger.get(&fx.ids[1]).unwrap();
        assert!(!failed.uploaded);
    }

    #[tokio::test]
    async fn test_missing_token_is_per_item_failure() {
        let mut fx = fixture(2);
        fx.credentials.clear().unwrap();
        let gateway = StubGateway::always_succeed();

        let summary = run_batch(
            &mut fx.ledger,
            fx.ids.clone(),
            &gateway,
            &fx.credentials,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert!(summary.succeeded.is_empty());
        assert_eq!(summary.failed.len(), 2);
        assert!(summary.failed[0].error.contains("Please log in"));
    }

    #[tokio::test]
    async fn test_already_uploaded_and_unknown_ids_are_skipped() {
        let mut fx = fixture(2);
        fx.ledger.mark_uploaded(&fx.ids[0].clone()).unwrap();
        let gateway = StubGateway::always_succeed();

        let mut selection = fx.ids.clone();
        selection.push("no-such-id".to_string());

        let summary = run_batch(
            &mut fx.ledger,
            selection,
            &gateway,
            &fx.credentials,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.succeeded, vec![fx.ids[1].clone()]);
    }

    #[tokio::test]
    async fn test_cancel_flag_stops_before_next_item() {
        let mut fx = fixture(3);
        let gateway = StubGateway::always_succeed();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let summary = run_batch(
            &mut fx.ledger,
            fx.ids.clone(),
            &gateway,
            &fx.credentials,
            &cancel,
        )
        .await
        .unwrap();

        assert!(summary.cancelled);
        assert!(summary.succeeded.is_empty());
        assert!(fx.ledger.records().iter().all(|r| !r.uploaded));
    }

    #[tokio::test]
    async fn test_purge_removes_exactly_succeeded_ids() {
        let mut fx = fixture(3);
        let gateway = StubGateway::failing_for(&["C-2"]);

        let summary = run_batch(
            &mut fx.ledger,
            fx.ids.clone(),
            &gateway,
            &fx.credentials,
            &CancelFlag::new(),
        )
        .await
        .unwrap();
        assert_eq!(summary.succeeded.len(), 2);

        let uploaded_uris: Vec<String> = fx
            .ledger
            .records()
            .iter()
            .filter(|r| r.uploaded)
            .map(|r| r.uri.clone())
            .collect();

        let report = purge_uploaded(&mut fx.ledger, &summary.succeeded).unwrap();
        assert_eq!(report.removed, 2);
        assert!(report.file_errors.is_empty());
        for uri in &uploaded_uris {
            assert!(!Path::new(uri).exists());
        }

        // The failed record stays, file intact
        assert_eq!(fx.ledger.len(), 1);
        assert!(Path::new(&fx.ledger.records()[0].uri).exists());
    }

    #[tokio::test]
    async fn test_purge_file_error_does_not_roll_back() {
        let mut fx = fixture(2);
        let gateway = StubGateway::always_succeed();

        let summary = run_batch(
            &mut fx.ledger,
            fx.ids.clone(),
            &gateway,
            &fx.credentials,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        // Simulate a deletion failure: one backing file vanishes first
        let gone = fx.ledger.records()[0].uri.clone();
        let kept = fx.ledger.records()[1].uri.clone();
        std::fs::remove_file(&gone).unwrap();

        let report = purge_uploaded(&mut fx.ledger, &summary.succeeded).unwrap();
        assert_eq!(report.removed, 2);
        assert_eq!(report.file_errors.len(), 1);
        assert_eq!(report.file_errors[0].0, gone);
        // The other file was still deleted, and the ledger removal stands
        assert!(!Path::new(&kept).exists());
        assert!(fx.ledger.is_empty());
    }
}
