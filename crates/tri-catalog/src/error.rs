use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog has no tables")]
    Empty,

    #[error("Duplicate table in catalog: {0}")]
    DuplicateTable(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),
}
