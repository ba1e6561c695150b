use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditKind, VoteType};

/// A query the warehouse rejected.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorLogEntry {
    pub question: String,
    pub generated_sql: String,
    pub error_message: String,
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
}

/// A query that ran but returned no rows.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ZeroResultLogEntry {
    pub question: String,
    pub sql: String,
    pub attempt_number: u32,
    pub timestamp: DateTime<Utc>,
}

/// A completed interaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionLogEntry {
    pub question: String,
    pub generated_sql: String,
    pub summary: String,
    #[serde(default)]
    pub is_follow_up: bool,
    #[serde(default)]
    pub previous_question: Option<String>,
    /// Attempts spent producing `generated_sql`.
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// A thumbs-up / thumbs-down on a rendered answer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VoteFeedbackEntry {
    pub vote_type: VoteType,
    pub question: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// Envelope over the four audit shapes, tagged by `kind` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    ErrorLog(ErrorLogEntry),
    ZeroResultLog(ZeroResultLogEntry),
    QuestionLog(QuestionLogEntry),
    VoteFeedback(VoteFeedbackEntry),
}

impl AuditRecord {
    #[must_use]
    pub const fn kind(&self) -> AuditKind {
        match self {
            Self::ErrorLog(_) => AuditKind::ErrorLog,
            Self::ZeroResultLog(_) => AuditKind::ZeroResultLog,
            Self::QuestionLog(_) => AuditKind::QuestionLog,
            Self::VoteFeedback(_) => AuditKind::VoteFeedback,
        }
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ErrorLog(e) => e.timestamp,
            Self::ZeroResultLog(e) => e.timestamp,
            Self::QuestionLog(e) => e.timestamp,
            Self::VoteFeedback(e) => e.timestamp,
        }
    }
}
