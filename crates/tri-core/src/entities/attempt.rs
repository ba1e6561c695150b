use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What happened to one synthesize → validate → execute cycle.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The query returned rows. The rows themselves travel on the final result.
    Success { row_count: usize },
    EmptyResult,
    ExecutionError { message: String },
    SafetyRejected { reason: String },
}

impl AttemptOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::EmptyResult => "empty_result",
            Self::ExecutionError { .. } => "execution_error",
            Self::SafetyRejected { .. } => "safety_rejected",
        }
    }
}

/// One iteration of the retry loop. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt number within the request.
    pub attempt: u32,
    pub query: String,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    #[must_use]
    pub fn new(attempt: u32, query: impl Into<String>, outcome: AttemptOutcome) -> Self {
        Self {
            attempt,
            query: query.into(),
            outcome,
        }
    }
}
