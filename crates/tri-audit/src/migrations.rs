//! Embedded audit schema, applied on every open. All statements are idempotent.

use crate::error::AuditError;

const MIGRATION_001: &str = include_str!("../migrations/001_audit.sql");

pub async fn run(conn: &libsql::Connection) -> Result<(), AuditError> {
    conn.execute_batch(MIGRATION_001)
        .await
        .map_err(|e| AuditError::Migration(format!("001_audit: {e}")))?;
    Ok(())
}
