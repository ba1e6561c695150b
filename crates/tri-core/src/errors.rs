//! Cross-cutting error types.
//!
//! Domain-specific errors (`LlmError`, `WarehouseError`, `AuditError`, ...) live
//! in their respective crates. `tri-engine` folds them into attempt
//! outcomes; the binary reports the rest through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any crate in the workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
