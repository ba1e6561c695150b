//! JSONL audit sink.
//!
//! Appends each record to `{dir}/{kind}.jsonl` with
//! `serde_jsonlines::append_json_lines`, one line per record. A mutex
//! serializes writers within the process so lines never interleave.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tri_core::entities::AuditRecord;
use tri_core::enums::AuditKind;

use crate::{AuditSink, error::AuditError};

pub struct JsonlAuditSink {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonlAuditSink {
    /// Create a sink writing into `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Io` if the directory cannot be created.
    pub fn new(dir: PathBuf) -> Result<Self, AuditError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// File that records of `kind` are appended to.
    #[must_use]
    pub fn path_for(&self, kind: AuditKind) -> PathBuf {
        self.dir.join(format!("{}.jsonl", kind.as_str()))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read back every record of `kind`. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Io` if the file exists but cannot be parsed.
    pub fn read(&self, kind: AuditKind) -> Result<Vec<AuditRecord>, AuditError> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let records = serde_jsonlines::json_lines(&path)?.collect::<Result<Vec<AuditRecord>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let path = self.path_for(record.kind());
        let _guard = self.lock.lock().map_err(|_| AuditError::Poisoned)?;
        serde_jsonlines::append_json_lines(&path, [record])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tri_core::entities::{VoteFeedbackEntry, ZeroResultLogEntry};
    use tri_core::enums::VoteType;

    fn zero(attempt: u32) -> AuditRecord {
        AuditRecord::ZeroResultLog(ZeroResultLogEntry {
            question: "Who won in 1850?".into(),
            sql: format!("SELECT {attempt}"),
            attempt_number: attempt,
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn records_land_in_per_kind_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlAuditSink::new(dir.path().join("audit")).unwrap();

        sink.record(&zero(1)).await.unwrap();
        sink.record(&zero(2)).await.unwrap();
        sink.record(&AuditRecord::VoteFeedback(VoteFeedbackEntry {
            vote_type: VoteType::Down,
            question: "q".into(),
            summary: "s".into(),
            timestamp: Utc::now(),
        }))
        .await
        .unwrap();

        let zeros = sink.read(AuditKind::ZeroResultLog).unwrap();
        assert_eq!(zeros, vec![zero_like(&zeros[0], 1), zero_like(&zeros[1], 2)]);
        assert_eq!(sink.read(AuditKind::VoteFeedback).unwrap().len(), 1);
        assert!(sink.read(AuditKind::ErrorLog).unwrap().is_empty());
    }

    /// Rebuild the expected record using the stored timestamp.
    fn zero_like(stored: &AuditRecord, attempt: u32) -> AuditRecord {
        AuditRecord::ZeroResultLog(ZeroResultLogEntry {
            question: "Who won in 1850?".into(),
            sql: format!("SELECT {attempt}"),
            attempt_number: attempt,
            timestamp: stored.timestamp(),
        })
    }

    #[tokio::test]
    async fn lines_are_tagged_with_kind() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlAuditSink::new(dir.path().to_path_buf()).unwrap();
        sink.record(&zero(3)).await.unwrap();

        let text = std::fs::read_to_string(sink.path_for(AuditKind::ZeroResultLog)).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains(r#""kind":"zero_result_log""#));
    }
}
