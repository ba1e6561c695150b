//! Engine error types.

use crate::guard::Stage;

/// Errors that end a request without a terminal answer.
///
/// Attempt-level failures (bad SQL, empty results, unsafe SQL, model errors
/// during selection or synthesis) never appear here: they are recorded as
/// attempt outcomes and folded into the terminal answer. Failed audit writes
/// are counted, not raised.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Retry state machine violation.
    #[error("core error: {0}")]
    Core(#[from] tri_core::errors::CoreError),

    /// The model named no known table and the fallback policy is `fail`.
    #[error("could not determine which tables answer: {question}")]
    SynthesisAmbiguous {
        /// The question being answered.
        question: String,
    },

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// A single model or warehouse call ran past its deadline.
    #[error("{stage} did not finish within {secs}s")]
    DeadlineExceeded {
        /// The step that timed out.
        stage: Stage,
        /// The configured per-call limit.
        secs: u64,
    },

    /// A vote was cast on a conversation with no turns.
    #[error("no answer to vote on")]
    NothingToVoteOn,
}
