//! # tri-audit
//!
//! Durable, write-only log of query attempts, completed interactions, and
//! user votes.
//!
//! The engine depends only on the [`AuditSink`] trait. Writes are
//! best-effort from the engine's point of view: a failed write is logged and
//! counted, never allowed to abort a user request. Every backend here accepts
//! concurrent appends from independent sessions.
//!
//! Backends:
//! - [`LibSqlAuditSink`]: one table per record kind in a local libSQL file
//! - [`JsonlAuditSink`]: one `{kind}.jsonl` file per record kind
//! - [`NoopAuditSink`]: discards everything

mod error;
mod jsonl;
mod libsql_sink;
mod migrations;

pub use error::AuditError;
pub use jsonl::JsonlAuditSink;
pub use libsql_sink::LibSqlAuditSink;

use async_trait::async_trait;
use std::sync::Arc;
use tri_config::{AuditBackend, AuditConfig};
use tri_core::entities::AuditRecord;

/// Append-only destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Sink that accepts and discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Build the sink selected by configuration.
///
/// # Errors
///
/// Fails if the libSQL database or JSONL directory cannot be opened.
pub async fn open_sink(config: &AuditConfig) -> Result<Arc<dyn AuditSink>, AuditError> {
    let sink: Arc<dyn AuditSink> = match config.backend {
        AuditBackend::Libsql => Arc::new(LibSqlAuditSink::open_local(&config.db_path).await?),
        AuditBackend::Jsonl => Arc::new(JsonlAuditSink::new(config.trail_dir.clone().into())?),
        AuditBackend::None => Arc::new(NoopAuditSink),
    };
    tracing::debug!(backend = ?config.backend, "audit sink opened");
    Ok(sink)
}
