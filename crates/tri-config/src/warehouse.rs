//! DuckDB warehouse configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WarehouseConfig {
    /// DuckDB database file. Empty means an in-memory database.
    #[serde(default)]
    pub path: String,

    /// Directory of `<table>.csv` files loaded as tables when the warehouse opens.
    #[serde(default)]
    pub seed_dir: String,
}

impl WarehouseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.is_empty()
    }

    pub fn has_seed_dir(&self) -> bool {
        !self.seed_dir.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_in_memory_without_seed() {
        let config = WarehouseConfig::default();
        assert!(config.is_in_memory());
        assert!(!config.has_seed_dir());
    }
}
