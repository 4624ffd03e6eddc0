//! The recording ledger: every locally saved call, persisted as one JSON blob.
//!
//! The ledger is an ordered list of [`RecordingRecord`]s, insertion order
//! significant, no two records sharing a `uri`. Every mutation rewrites the
//! whole blob in a single overwrite; record counts are small and per-device,
//! so the O(n) rewrite is the accepted trade-off.
//!
//! Records whose backing audio file has disappeared are pruned lazily at
//! [`Ledger::open`] and the pruned list is written through, so they never
//! reappear on a later load.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::RecordingRecord;

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A record with the same audio file is already in the ledger
    #[error("a recording for this audio file has already been saved")]
    DuplicateRejected,

    /// The ledger blob could not be read, parsed, or written
    #[error("recording ledger persistence failed: {0}")]
    Persistence(String),
}

/// The set of locally saved recordings for this device.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: Vec<RecordingRecord>,
}

impl Ledger {
    /// Open the ledger at `path`, pruning records whose backing file is gone.
    ///
    /// A missing blob is an empty ledger ("no data yet"). An unreadable or
    /// unparsable blob is surfaced as [`LedgerError::Persistence`] and left
    /// untouched on disk, rather than being silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    records: Vec::new(),
                });
            }
            Err(e) => {
                return Err(LedgerError::Persistence(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let all: Vec<RecordingRecord> = serde_json::from_str(&contents).map_err(|e| {
            LedgerError::Persistence(format!("failed to parse {}: {e}", path.display()))
        })?;

        let before = all.len();
        let records: Vec<RecordingRecord> = all
            .into_iter()
            .filter(|record| {
                let exists = Path::new(&record.uri).exists();
                if !exists {
                    crate::verbose!("Recording file not found, dropping from ledger: {}", record.uri);
                }
                exists
            })
            .collect();

        let ledger = Self { path, records };
        if ledger.records.len() < before {
            // Write-through prune so stale entries never reappear
            ledger.persist()?;
        }
        Ok(ledger)
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[RecordingRecord] {
        &self.records
    }

    /// Find a record by id.
    pub fn get(&self, id: &str) -> Option<&RecordingRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Append a record and persist.
    ///
    /// Rejects the add when a record with the same `uri` already exists; the
    /// ledger is unchanged in that case.
    pub fn add(&mut self, record: RecordingRecord) -> Result<(), LedgerError> {
        if self.records.iter().any(|existing| existing.uri == record.uri) {
            return Err(LedgerError::DuplicateRejected);
        }
        self.records.push(record);
        self.persist()
    }

    /// Set `uploaded = true` on the record with `id` and persist.
    ///
    /// Idempotent: a record that is already uploaded stays uploaded, and an
    /// unknown id is a no-op. Returns whether the id resolved.
    pub fn mark_uploaded(&mut self, id: &str) -> Result<bool, LedgerError> {
        let found = self.flag_uploaded(id);
        if found {
            self.persist()?;
        }
        Ok(found)
    }

    /// Remove every record whose id is in `ids` and persist.
    ///
    /// Backing files are not touched; callers decide whether to delete them.
    /// Returns the number of records removed.
    pub fn remove(&mut self, ids: &HashSet<String>) -> Result<usize, LedgerError> {
        let before = self.records.len();
        self.records.retain(|record| !ids.contains(&record.id));
        let removed = before - self.records.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Flip the uploaded flag in memory without persisting.
    ///
    /// Batch reconciliation applies per-item flags to the in-memory snapshot
    /// and persists once at the end of the batch.
    pub(crate) fn flag_uploaded(&mut self, id: &str) -> bool {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.uploaded = true;
                true
            }
            None => false,
        }
    }

    /// Rewrite the whole blob in one overwrite.
    pub(crate) fn persist(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LedgerError::Persistence(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| LedgerError::Persistence(format!("failed to serialize ledger: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            LedgerError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"audio").unwrap();
        path
    }

    fn record_for(path: &Path, customer: &str) -> RecordingRecord {
        RecordingRecord::new(path.to_str().unwrap(), customer, "agent-1", 61_000).unwrap()
    }

    #[test]
    fn test_open_missing_blob_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("recordings.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_surfaced_not_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("recordings.json");
        std::fs::write(&blob, b"{not json").unwrap();

        let err = Ledger::open(&blob).unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        // Blob left in place for inspection
        assert!(blob.exists());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("recordings.json");
        let mut ledger = Ledger::open(&blob).unwrap();

        for i in 0..4 {
            let file = touch(dir.path(), &format!("call{i}.m4a"));
            ledger.add(record_for(&file, &format!("C-{i}"))).unwrap();
        }

        let reloaded = Ledger::open(&blob).unwrap();
        let customers: Vec<&str> = reloaded
            .records()
            .iter()
            .map(|r| r.customer_number.as_str())
            .collect();
        assert_eq!(customers, vec!["C-0", "C-1", "C-2", "C-3"]);
    }

    #[test]
    fn test_duplicate_uri_rejected_without_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path().join("recordings.json")).unwrap();
        let file = touch(dir.path(), "call.m4a");

        ledger.add(record_for(&file, "C-1")).unwrap();
        let err = ledger.add(record_for(&file, "C-2")).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateRejected));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].customer_number, "C-1");
    }

    #[test]
    fn test_mark_uploaded_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("recordings.json");
        let mut ledger = Ledger::open(&blob).unwrap();
        let file = touch(dir.path(), "call.m4a");
        let record = record_for(&file, "C-1");
        let id = record.id.clone();
        ledger.add(record).unwrap();

        assert!(ledger.mark_uploaded(&id).unwrap());
        assert!(ledger.mark_uploaded(&id).unwrap());

        let reloaded = Ledger::open(&blob).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.records()[0].uploaded);
    }

    #[test]
    fn test_mark_uploaded_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(dir.path().join("recordings.json")).unwrap();
        assert!(!ledger.mark_uploaded("no-such-id").unwrap());
    }

    #[test]
    fn test_open_prunes_missing_files_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("recordings.json");
        let keep = touch(dir.path(), "keep.m4a");
        let gone = touch(dir.path(), "gone.m4a");

        {
            let mut ledger = Ledger::open(&blob).unwrap();
            ledger.add(record_for(&keep, "C-keep")).unwrap();
            ledger.add(record_for(&gone, "C-gone")).unwrap();
        }

        // File deleted behind the ledger's back
        std::fs::remove_file(&gone).unwrap();

        let pruned = Ledger::open(&blob).unwrap();
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned.records()[0].customer_number, "C-keep");

        // Second load returns the same pruned result (prune was persisted)
        let again = Ledger::open(&blob).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again.records()[0].customer_number, "C-keep");
    }

    #[test]
    fn test_remove_filters_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let blob = dir.path().join("recordings.json");
        let mut ledger = Ledger::open(&blob).unwrap();

        let mut ids = Vec::new();
        for i in 0..3 {
            let file = touch(dir.path(), &format!("call{i}.m4a"));
            let record = record_for(&file, &format!("C-{i}"));
            ids.push(record.id.clone());
            ledger.add(record).unwrap();
        }

        let doomed: HashSet<String> = [ids[0].clone(), ids[2].clone()].into_iter().collect();
        assert_eq!(ledger.remove(&doomed).unwrap(), 2);

        let reloaded = Ledger::open(&blob).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].id, ids[1]);
        // Backing files are untouched by remove
        assert!(dir.path().join("call0.m4a").exists());
    }
}
