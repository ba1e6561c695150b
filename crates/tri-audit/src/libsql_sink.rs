//! libSQL-backed audit sink.

use async_trait::async_trait;
use libsql::Builder;
use tri_core::entities::AuditRecord;
use tri_core::enums::AuditKind;

use crate::{AuditSink, error::AuditError, migrations};

/// Audit sink writing to a local libSQL database, one table per record kind.
pub struct LibSqlAuditSink {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LibSqlAuditSink {
    /// Open (or create) the database at `path` and apply the audit schema.
    ///
    /// Pass `":memory:"` for a throwaway database.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if the database cannot be opened or migrated.
    pub async fn open_local(path: &str) -> Result<Self, AuditError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && path != ":memory:" {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        migrations::run(&conn).await?;
        Ok(Self { db, conn })
    }

    /// Access the underlying connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Number of rows recorded for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if the query fails.
    pub async fn count(&self, kind: AuditKind) -> Result<u64, AuditError> {
        let mut rows = self
            .conn
            .query(&format!("SELECT count(*) FROM {}", kind.as_str()), ())
            .await?;
        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl AuditSink for LibSqlAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        match record {
            AuditRecord::ErrorLog(e) => {
                self.conn
                    .execute(
                        "INSERT INTO error_log (question, generated_sql, error_message, attempt, timestamp)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        libsql::params![
                            e.question.as_str(),
                            e.generated_sql.as_str(),
                            e.error_message.as_str(),
                            i64::from(e.attempt),
                            e.timestamp.to_rfc3339()
                        ],
                    )
                    .await?;
            }
            AuditRecord::ZeroResultLog(e) => {
                self.conn
                    .execute(
                        "INSERT INTO zero_result_log (question, sql, attempt_number, timestamp)
                         VALUES (?1, ?2, ?3, ?4)",
                        libsql::params![
                            e.question.as_str(),
                            e.sql.as_str(),
                            i64::from(e.attempt_number),
                            e.timestamp.to_rfc3339()
                        ],
                    )
                    .await?;
            }
            AuditRecord::QuestionLog(e) => {
                self.conn
                    .execute(
                        "INSERT INTO question_log (question, generated_sql, summary, is_follow_up,
                                                   previous_question, attempts, duration_ms, timestamp)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        libsql::params![
                            e.question.as_str(),
                            e.generated_sql.as_str(),
                            e.summary.as_str(),
                            i64::from(e.is_follow_up),
                            e.previous_question.as_deref(),
                            i64::from(e.attempts),
                            i64::try_from(e.duration_ms).unwrap_or(i64::MAX),
                            e.timestamp.to_rfc3339()
                        ],
                    )
                    .await?;
            }
            AuditRecord::VoteFeedback(e) => {
                self.conn
                    .execute(
                        "INSERT INTO vote_feedback (vote_type, question, summary, timestamp)
                         VALUES (?1, ?2, ?3, ?4)",
                        libsql::params![
                            e.vote_type.as_str(),
                            e.question.as_str(),
                            e.summary.as_str(),
                            e.timestamp.to_rfc3339()
                        ],
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
