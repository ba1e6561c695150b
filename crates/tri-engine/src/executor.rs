//! Pass-through from generated SQL to the warehouse port.

use tri_core::entities::RowSet;
use tri_warehouse::Warehouse;

/// A failed statement, with the warehouse's own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub message: String,
}

#[derive(Clone, Copy)]
pub struct QueryExecutor<'a> {
    warehouse: &'a dyn Warehouse,
}

impl<'a> QueryExecutor<'a> {
    #[must_use]
    pub const fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self { warehouse }
    }

    /// Run `query` once. No retry, caching, or rewriting.
    ///
    /// # Errors
    ///
    /// Any warehouse failure, as its unprefixed message.
    pub async fn execute(&self, query: &str) -> Result<RowSet, ExecutionError> {
        self.warehouse.execute(query).await.map_err(|e| ExecutionError {
            message: e.message(),
        })
    }
}
