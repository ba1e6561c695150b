//! Warehouse error types.

/// Errors that can occur in the warehouse layer.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// `DuckDB` rejected or failed the statement.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error (seed directory scanning, CSV files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A table name that cannot be used as a bare identifier.
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    /// The blocking query task panicked or was cancelled.
    #[error("Query task failed: {0}")]
    Task(String),

    /// A statement failure reported as plain text.
    #[error("{0}")]
    Statement(String),

    /// A previous query panicked while holding the connection.
    #[error("Warehouse connection is poisoned")]
    Poisoned,
}

impl WarehouseError {
    /// The underlying message with no layer prefix, as shown to the model.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::DuckDb(e) => e.to_string(),
            Self::Statement(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
