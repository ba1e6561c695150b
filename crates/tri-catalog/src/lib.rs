//! # tri-catalog
//!
//! Static descriptions of every table the engine may query.
//!
//! The catalog is pure data: a one-line summary per table (shown to the model
//! when it picks tables), a detailed schema text (shown only for the tables it
//! picked), join keys, and the dialect guidelines prepended to every
//! synthesis prompt. It is built once at startup and never mutated.

mod builtin;
mod catalog;
mod error;

pub use builtin::CATALOG_VERSION;
pub use catalog::{SchemaCatalog, TableDescriptor};
pub use error::CatalogError;
