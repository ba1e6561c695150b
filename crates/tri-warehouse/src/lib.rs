//! # tri-warehouse
//!
//! The warehouse port the engine executes queries through, and a `DuckDB`
//! implementation of it.
//!
//! `DuckDB` is synchronous, so [`DuckDbWarehouse`] runs every statement on
//! tokio's blocking pool behind a mutex-guarded connection. Result cells are
//! converted to JSON values so rows can travel in a [`tri_core::entities::RowSet`].

mod convert;
mod duck;
mod error;

pub use duck::DuckDbWarehouse;
pub use error::WarehouseError;

use async_trait::async_trait;
use tri_core::entities::RowSet;

/// Something that can run a read query and hand back rows.
///
/// Implementations are a faithful pass-through: no retry, caching, or rewriting.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute(&self, query: &str) -> Result<RowSet, WarehouseError>;
}
