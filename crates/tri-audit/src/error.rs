//! Audit sink error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// JSONL file write failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous writer panicked while holding the file lock.
    #[error("Audit writer lock is poisoned")]
    Poisoned,
}
