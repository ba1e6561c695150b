//! Response types returned by the engine and emitted as JSON by `tri`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AttemptRecord, RowSet};
use crate::enums::{TerminalState, VoteType};

/// Everything produced by one `ask` request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AskResponse {
    pub question: String,
    /// Narrative answer, canned terminal message, or raw-row fallback.
    pub answer: String,
    /// Query of the final attempt. Empty when no attempt produced one.
    pub sql: String,
    pub terminal_state: TerminalState,
    pub attempts: Vec<AttemptRecord>,
    /// Final rows. Empty unless `terminal_state` is `success`.
    pub rows: RowSet,
    /// Tables offered to the synthesizer on the final attempt.
    pub tables: Vec<String>,
    /// Whether `answer` came from the summarizer rather than a fallback.
    pub summarized: bool,
    /// More rows came back than the summary preview shows.
    pub large_result: bool,
    pub duration_ms: u64,
    /// Audit writes that failed during this request.
    pub audit_failures: u32,
}

impl AskResponse {
    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        u32::try_from(self.attempts.len()).unwrap_or(u32::MAX)
    }
}

/// Response from `tri check-sql`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SafetyCheckResponse {
    pub query: String,
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Response from `tri vote`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VoteResponse {
    pub vote_type: VoteType,
    pub question: String,
    pub recorded: bool,
}

/// Response from `tri load`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LoadResponse {
    pub table: String,
    pub rows_loaded: u64,
}
