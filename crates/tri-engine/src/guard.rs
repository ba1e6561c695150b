//! Cancellation and per-call deadlines for model and warehouse calls.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

/// The external call being guarded, for deadline errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TableSelection,
    Synthesis,
    Execution,
    Summary,
    Audit,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TableSelection => "table selection",
            Self::Synthesis => "query synthesis",
            Self::Execution => "query execution",
            Self::Summary => "summary",
            Self::Audit => "audit write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request call guard: one cancellation token, one per-call limit.
#[derive(Debug, Clone)]
pub struct CallGuard {
    cancel: CancellationToken,
    timeout: Duration,
}

impl CallGuard {
    #[must_use]
    pub const fn new(cancel: CancellationToken, timeout: Duration) -> Self {
        Self { cancel, timeout }
    }

    /// Race `call` against cancellation and the per-call deadline.
    ///
    /// Dropping the losing future abandons the call; nothing is left running
    /// on behalf of the request except blocking warehouse work, which
    /// finishes on its own thread and is discarded.
    ///
    /// # Errors
    ///
    /// [`EngineError::Cancelled`] if the token fires first,
    /// [`EngineError::DeadlineExceeded`] if the deadline passes first.
    pub async fn run<F, T>(&self, stage: Stage, call: F) -> Result<T, EngineError>
    where
        F: Future<Output = T>,
    {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::debug!(%stage, "call cancelled");
                Err(EngineError::Cancelled)
            }
            outcome = tokio::time::timeout(self.timeout, call) => outcome.map_err(|_| {
                tracing::warn!(%stage, secs = self.timeout.as_secs(), "call deadline exceeded");
                EngineError::DeadlineExceeded {
                    stage,
                    secs: self.timeout.as_secs(),
                }
            }),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(timeout_ms: u64) -> (CancellationToken, CallGuard) {
        let token = CancellationToken::new();
        let guard = CallGuard::new(token.clone(), Duration::from_millis(timeout_ms));
        (token, guard)
    }

    #[tokio::test]
    async fn completed_call_passes_through() {
        let (_token, guard) = guard(1_000);
        let value = guard.run(Stage::Synthesis, async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let (token, guard) = guard(1_000);
        token.cancel();
        let err = guard.run(Stage::Execution, async { 1 }).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[tokio::test]
    async fn cancellation_abandons_pending_call() {
        let (token, guard) = guard(60_000);
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = guard
            .run(Stage::TableSelection, std::future::pending::<()>())
            .await
            .unwrap_err();
        canceller.await.unwrap();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[tokio::test]
    async fn deadline_names_the_stage() {
        let (_token, guard) = guard(10);
        let err = guard
            .run(Stage::Summary, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DeadlineExceeded {
                stage: Stage::Summary,
                ..
            }
        ));
        assert!(err.to_string().starts_with("summary did not finish"));
    }
}
