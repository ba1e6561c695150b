//! The bounded synthesize, validate, execute loop.
//!
//! ```text
//! attempting(1) ──empty/error──▶ attempting(2) ── ... ──▶ attempting(max)
//!      │                                                       │
//!      ├─rows──▶ success                      empty──▶ empty_exhausted
//!      └─unsafe─▶ safety_blocked              error──▶ error_exhausted
//! ```
//!
//! Every attempt after the first sees the outcomes of all earlier attempts of
//! the same request, verbatim and in order. Nothing carries over between
//! requests.

use chrono::Utc;
use tri_audit::AuditSink;
use tri_catalog::SchemaCatalog;
use tri_config::{EngineConfig, SelectionFallback};
use tri_core::entities::{AttemptOutcome, AttemptRecord, AuditRecord, ErrorLogEntry, RowSet, ZeroResultLogEntry};
use tri_core::enums::{RetryState, TerminalState};
use tri_llm::{LanguageModel, LlmError};
use tri_warehouse::Warehouse;

use crate::error::EngineError;
use crate::executor::QueryExecutor;
use crate::guard::{CallGuard, Stage};
use crate::safety;
use crate::selector::TableSelector;
use crate::synthesizer::QuerySynthesizer;

/// Appended after the feedback lines on every retry.
pub const REVISION_INSTRUCTION: &str = "The attempts above did not produce an answer. Revise the SQL \
so it does not repeat the same mistake, and use only the columns documented in the schema above.";

/// Prefix for model failures recorded as execution errors.
pub const MODEL_ERROR_PREFIX: &str = "language model error:";

/// Outcomes of the current request's attempts, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptLog {
    records: Vec<AttemptRecord>,
}

impl AttemptLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// The log extended by one record.
    #[must_use]
    pub fn with(mut self, record: AttemptRecord) -> Self {
        self.records.push(record);
        self
    }

    #[must_use]
    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<AttemptRecord> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Error messages of every failed attempt, in order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|r| match &r.outcome {
                AttemptOutcome::ExecutionError { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Context for the next attempt: `base` alone before any failure,
    /// otherwise `base` followed by one line per earlier attempt and the
    /// revision instruction.
    #[must_use]
    pub fn context_for(&self, base: &str) -> String {
        let lines: Vec<String> = self.records.iter().filter_map(feedback_line).collect();
        if lines.is_empty() {
            return base.to_string();
        }
        format!("{base}\n\n{}\n\n{REVISION_INSTRUCTION}", lines.join("\n"))
    }
}

/// The feedback line an attempt contributes to later attempts, if any.
#[must_use]
pub fn feedback_line(record: &AttemptRecord) -> Option<String> {
    match &record.outcome {
        AttemptOutcome::EmptyResult => {
            Some(format!("[NOTE] previous SQL returned 0 rows: {}", record.query))
        }
        AttemptOutcome::ExecutionError { message } => Some(format!(
            "[ERROR LOG] previous SQL failed: {} → {message}",
            record.query
        )),
        AttemptOutcome::Success { .. } | AttemptOutcome::SafetyRejected { .. } => None,
    }
}

/// The audit row an attempt produces, if any. Successful attempts are
/// logged once the request completes, with the summary.
#[must_use]
pub fn audit_record(question: &str, record: &AttemptRecord) -> Option<AuditRecord> {
    let timestamp = Utc::now();
    match &record.outcome {
        AttemptOutcome::ExecutionError { message } => Some(AuditRecord::ErrorLog(ErrorLogEntry {
            question: question.to_string(),
            generated_sql: record.query.clone(),
            error_message: message.clone(),
            attempt: record.attempt,
            timestamp,
        })),
        AttemptOutcome::SafetyRejected { reason } => Some(AuditRecord::ErrorLog(ErrorLogEntry {
            question: question.to_string(),
            generated_sql: record.query.clone(),
            error_message: format!("Unsafe SQL detected. Execution blocked: {reason}"),
            attempt: record.attempt,
            timestamp,
        })),
        AttemptOutcome::EmptyResult => Some(AuditRecord::ZeroResultLog(ZeroResultLogEntry {
            question: question.to_string(),
            sql: record.query.clone(),
            attempt_number: record.attempt,
            timestamp,
        })),
        AttemptOutcome::Success { .. } => None,
    }
}

/// Write one audit record without letting a failure reach the user.
///
/// Returns `Ok(false)` when the write failed or timed out. Only cancellation
/// is propagated.
pub(crate) async fn write_audit(
    sink: &dyn AuditSink,
    guard: &CallGuard,
    record: &AuditRecord,
) -> Result<bool, EngineError> {
    match guard.run(Stage::Audit, sink.record(record)).await {
        Ok(Ok(())) => Ok(true),
        Ok(Err(e)) => {
            tracing::warn!(kind = %record.kind(), error = %e, "audit write failed");
            Ok(false)
        }
        Err(EngineError::Cancelled) => Err(EngineError::Cancelled),
        Err(e) => {
            tracing::warn!(kind = %record.kind(), error = %e, "audit write abandoned");
            Ok(false)
        }
    }
}

/// Result of the loop for one request.
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub state: TerminalState,
    pub log: AttemptLog,
    /// Rows of the successful attempt; empty otherwise.
    pub rows: RowSet,
    /// Query of the final attempt.
    pub query: String,
    /// Tables offered on the final attempt.
    pub tables: Vec<String>,
    pub audit_failures: u32,
}

impl RetryOutcome {
    /// Reason given by the safety check, when the request was blocked.
    #[must_use]
    pub fn safety_reason(&self) -> Option<&str> {
        self.log.records().last().and_then(|r| match &r.outcome {
            AttemptOutcome::SafetyRejected { reason } => Some(reason.as_str()),
            _ => None,
        })
    }
}

/// One finished attempt.
struct Step {
    record: AttemptRecord,
    rows: RowSet,
    tables: Vec<String>,
}

impl Step {
    fn new(attempt: u32, query: String, outcome: AttemptOutcome, tables: Vec<String>) -> Self {
        Self {
            record: AttemptRecord::new(attempt, query, outcome),
            rows: RowSet::empty(),
            tables,
        }
    }

    fn model_failure(attempt: u32, tables: Vec<String>, error: &LlmError) -> Self {
        tracing::warn!(attempt, %error, "model call failed during attempt");
        Self::new(
            attempt,
            String::new(),
            AttemptOutcome::ExecutionError {
                message: format!("{MODEL_ERROR_PREFIX} {error}"),
            },
            tables,
        )
    }
}

/// Drives attempts for a single request.
pub struct RetryController<'a> {
    pub model: &'a dyn LanguageModel,
    pub warehouse: &'a dyn Warehouse,
    pub audit: &'a dyn AuditSink,
    pub catalog: &'a SchemaCatalog,
    pub config: &'a EngineConfig,
    pub guard: &'a CallGuard,
}

impl RetryController<'_> {
    /// Run attempts until a terminal state.
    ///
    /// # Errors
    ///
    /// Cancellation, a per-call deadline, or an ambiguous selection under
    /// the `fail` policy. Failed attempts are not errors.
    pub async fn run(&self, question: &str, base_context: &str) -> Result<RetryOutcome, EngineError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = RetryState::initial();
        let mut log = AttemptLog::new();
        let mut rows = RowSet::empty();
        let mut query = String::new();
        let mut tables = Vec::new();
        let mut audit_failures = 0u32;

        while let RetryState::Attempting(attempt) = state {
            let context = log.context_for(base_context);
            let step = self.attempt(attempt, question, &context).await?;

            let next = match &step.record.outcome {
                AttemptOutcome::Success { .. } => RetryState::Success,
                AttemptOutcome::SafetyRejected { .. } => RetryState::SafetyBlocked,
                AttemptOutcome::EmptyResult if attempt >= max_attempts => RetryState::EmptyExhausted,
                AttemptOutcome::ExecutionError { .. } if attempt >= max_attempts => {
                    RetryState::ErrorExhausted
                }
                AttemptOutcome::EmptyResult | AttemptOutcome::ExecutionError { .. } => {
                    RetryState::Attempting(attempt + 1)
                }
            };
            tracing::info!(
                attempt,
                outcome = step.record.outcome.as_str(),
                next = %next,
                "attempt finished"
            );

            if let Some(record) = audit_record(question, &step.record) {
                if !write_audit(self.audit, self.guard, &record).await? {
                    audit_failures += 1;
                }
            }

            state = state.transition(next)?;
            query.clone_from(&step.record.query);
            tables = step.tables;
            rows = step.rows;
            log = log.with(step.record);
        }

        let terminal = state.terminal().ok_or_else(|| {
            EngineError::Core(tri_core::errors::CoreError::Validation(format!(
                "retry loop ended in non-terminal state {state}"
            )))
        })?;

        Ok(RetryOutcome {
            state: terminal,
            log,
            rows,
            query,
            tables,
            audit_failures,
        })
    }

    async fn attempt(&self, attempt: u32, question: &str, context: &str) -> Result<Step, EngineError> {
        let selector = TableSelector::new(self.catalog, self.config.selection_temperature);
        let selection = match self
            .guard
            .run(Stage::TableSelection, selector.select(self.model, context))
            .await?
        {
            Ok(selection) => selection,
            Err(e) => return Ok(Step::model_failure(attempt, Vec::new(), &e)),
        };
        if selection.is_fallback() && self.config.selection_fallback == SelectionFallback::Fail {
            return Err(EngineError::SynthesisAmbiguous {
                question: question.to_string(),
            });
        }
        let tables = selection.tables().to_vec();

        let synthesizer = QuerySynthesizer::new(self.catalog, self.config.synthesis_temperature);
        let sql = match self
            .guard
            .run(Stage::Synthesis, synthesizer.synthesize(self.model, &tables, context))
            .await?
        {
            Ok(sql) => sql,
            Err(e) => return Ok(Step::model_failure(attempt, tables, &e)),
        };
        tracing::debug!(attempt, sql = %sql, "query synthesized");

        if let Err(violation) = safety::check(&sql) {
            tracing::warn!(attempt, sql = %sql, reason = %violation, "unsafe query blocked");
            let outcome = AttemptOutcome::SafetyRejected {
                reason: violation.to_string(),
            };
            return Ok(Step::new(attempt, sql, outcome, tables));
        }

        let executor = QueryExecutor::new(self.warehouse);
        let step = match self.guard.run(Stage::Execution, executor.execute(&sql)).await? {
            Ok(rows) if rows.is_empty() => Step::new(attempt, sql, AttemptOutcome::EmptyResult, tables),
            Ok(rows) => {
                let outcome = AttemptOutcome::Success {
                    row_count: rows.len(),
                };
                Step {
                    rows,
                    ..Step::new(attempt, sql, outcome, tables)
                }
            }
            Err(e) => Step::new(
                attempt,
                sql,
                AttemptOutcome::ExecutionError { message: e.message },
                tables,
            ),
        };
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn failed(n: u32, query: &str, message: &str) -> AttemptRecord {
        AttemptRecord::new(
            n,
            query,
            AttemptOutcome::ExecutionError {
                message: message.into(),
            },
        )
    }

    fn empty(n: u32, query: &str) -> AttemptRecord {
        AttemptRecord::new(n, query, AttemptOutcome::EmptyResult)
    }

    #[test]
    fn first_attempt_sees_base_context_only() {
        assert_eq!(AttemptLog::new().context_for("base"), "base");
    }

    #[test]
    fn feedback_lines_follow_attempt_order() {
        let log = AttemptLog::new()
            .with(failed(1, "SELECT x FROM t", "column x not found"))
            .with(empty(2, "SELECT a FROM t WHERE b = 1"))
            .with(failed(3, "SELECT y FROM t", "column y not found"));
        assert_eq!(
            log.context_for("base"),
            format!(
                "base\n\n\
                 [ERROR LOG] previous SQL failed: SELECT x FROM t → column x not found\n\
                 [NOTE] previous SQL returned 0 rows: SELECT a FROM t WHERE b = 1\n\
                 [ERROR LOG] previous SQL failed: SELECT y FROM t → column y not found\n\n\
                 {REVISION_INSTRUCTION}"
            )
        );
    }

    #[test]
    fn repeated_failures_are_not_deduplicated() {
        let log = AttemptLog::new()
            .with(failed(1, "SELECT x", "boom"))
            .with(failed(2, "SELECT x", "boom"));
        assert_eq!(log.context_for("b").matches("[ERROR LOG]").count(), 2);
        assert_eq!(log.error_messages(), vec!["boom", "boom"]);
    }

    #[test]
    fn with_leaves_earlier_log_untouched() {
        let first = AttemptLog::new().with(empty(1, "SELECT 1"));
        let second = first.clone().with(empty(2, "SELECT 2"));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn audit_rows_match_outcomes() {
        let error = audit_record("q", &failed(2, "SELECT x", "boom")).unwrap();
        let AuditRecord::ErrorLog(entry) = error else {
            panic!("expected error log");
        };
        assert_eq!(entry.attempt, 2);
        assert_eq!(entry.error_message, "boom");

        let zero = audit_record("q", &empty(4, "SELECT 1")).unwrap();
        assert!(matches!(zero, AuditRecord::ZeroResultLog(ZeroResultLogEntry { attempt_number: 4, .. })));

        let blocked = AttemptRecord::new(
            1,
            "DROP TABLE t",
            AttemptOutcome::SafetyRejected {
                reason: "query contains forbidden keyword 'drop'".into(),
            },
        );
        let AuditRecord::ErrorLog(entry) = audit_record("q", &blocked).unwrap() else {
            panic!("expected error log");
        };
        assert!(entry.error_message.starts_with("Unsafe SQL detected. Execution blocked"));

        let ok = AttemptRecord::new(1, "SELECT 1", AttemptOutcome::Success { row_count: 1 });
        assert_eq!(audit_record("q", &ok), None);
    }
}
