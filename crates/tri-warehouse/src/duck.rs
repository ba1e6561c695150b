//! `DuckDB`-backed warehouse.

use async_trait::async_trait;
use duckdb::Connection;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex};
use tri_config::WarehouseConfig;
use tri_core::entities::RowSet;

use crate::{Warehouse, WarehouseError, convert};

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name regex"));

/// Local `DuckDB` database exposed through the [`Warehouse`] port.
#[derive(Clone)]
pub struct DuckDbWarehouse {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbWarehouse {
    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::DuckDb`] if the file cannot be opened.
    pub fn open_local(path: &str) -> Result<Self, WarehouseError> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::DuckDb`] if `DuckDB` cannot start.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Open according to configuration, then load any seed CSV files.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or a seed file cannot be loaded.
    pub fn open(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let warehouse = if config.is_in_memory() {
            Self::open_in_memory()?
        } else {
            Self::open_local(&config.path)?
        };
        if config.has_seed_dir() {
            let loaded = warehouse.seed_from_dir(Path::new(&config.seed_dir))?;
            tracing::info!(dir = %config.seed_dir, tables = loaded.len(), "seeded warehouse");
        }
        Ok(warehouse)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Replace `table` with the contents of a CSV file. Returns the row count.
    ///
    /// # Errors
    ///
    /// Rejects table names that are not plain identifiers, and propagates
    /// `DuckDB` errors from reading the file.
    pub fn load_csv(&self, table: &str, csv_path: &Path) -> Result<u64, WarehouseError> {
        if !TABLE_NAME.is_match(table) {
            return Err(WarehouseError::InvalidTableName(table.to_string()));
        }
        let literal = csv_path.to_string_lossy().replace('\'', "''");
        let conn = self.conn.lock().map_err(|_| WarehouseError::Poisoned)?;
        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {table} AS SELECT * FROM read_csv_auto('{literal}')"
        ))?;
        let count: i64 = conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
            row.get(0)
        })?;
        tracing::debug!(table, rows = count, path = %csv_path.display(), "loaded csv");
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Load every `<table>.csv` in `dir`, in file-name order.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable directory entry or file.
    pub fn seed_from_dir(&self, dir: &Path) -> Result<Vec<(String, u64)>, WarehouseError> {
        let mut files: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
            .collect();
        files.sort();

        let mut loaded = Vec::with_capacity(files.len());
        for path in files {
            let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let rows = self.load_csv(table, &path)?;
            loaded.push((table.to_string(), rows));
        }
        Ok(loaded)
    }

    /// Names of user tables, sorted.
    ///
    /// # Errors
    ///
    /// Propagates `DuckDB` errors.
    pub fn tables(&self) -> Result<Vec<String>, WarehouseError> {
        let conn = self.conn.lock().map_err(|_| WarehouseError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT table_name FROM information_schema.tables
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

/// Run `query` and collect every row as JSON cells.
fn run_query(conn: &Connection, query: &str) -> Result<RowSet, WarehouseError> {
    let mut stmt = conn.prepare(query)?;
    let mut rows = stmt.query([])?;
    let columns = rows
        .as_ref()
        .map(duckdb::Statement::column_names)
        .unwrap_or_default();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            cells.push(convert::to_json(row.get::<_, duckdb::types::Value>(idx)?));
        }
        out.push(cells);
    }
    Ok(RowSet::new(columns, out))
}

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn execute(&self, query: &str) -> Result<RowSet, WarehouseError> {
        let conn = Arc::clone(&self.conn);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| WarehouseError::Poisoned)?;
            run_query(&conn, &query)
        })
        .await
        .map_err(|e| WarehouseError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn seeded() -> DuckDbWarehouse {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        {
            let conn = warehouse.conn.lock().unwrap();
            conn.execute_batch(
                "CREATE TABLE fct_race_results (athlete_name VARCHAR, athlete_finishing_place INTEGER, race_date DATE);
                 INSERT INTO fct_race_results VALUES
                   ('JELLE GEENS', 1, DATE '2024-12-15'),
                   ('KRISTIAN BLUMMENFELT', 2, DATE '2024-12-15');",
            )
            .unwrap();
        }
        warehouse
    }

    #[tokio::test]
    async fn execute_returns_aliased_columns() {
        let rows = seeded()
            .execute("SELECT athlete_name AS winner, race_date FROM fct_race_results WHERE athlete_finishing_place = 1")
            .await
            .unwrap();
        assert_eq!(rows.columns, vec!["winner", "race_date"]);
        assert_eq!(rows.rows, vec![vec![json!("JELLE GEENS"), json!("2024-12-15")]]);
    }

    #[tokio::test]
    async fn no_matching_rows_is_empty() {
        let rows = seeded()
            .execute("SELECT athlete_name FROM fct_race_results WHERE athlete_finishing_place > 10")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn execution_error_carries_duckdb_message() {
        let err = seeded()
            .execute("SELECT x FROM fct_race_results")
            .await
            .unwrap_err();
        assert!(matches!(err, WarehouseError::DuckDb(_)));
        assert!(err.message().contains('x'), "message was {}", err.message());
        assert!(!err.message().starts_with("DuckDB error"));
    }

    #[test]
    fn load_csv_rejects_bad_table_names() {
        let warehouse = DuckDbWarehouse::open_in_memory().unwrap();
        let err = warehouse
            .load_csv("results; DROP TABLE x", Path::new("results.csv"))
            .unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidTableName(_)));
    }

    #[test]
    fn tables_lists_created_tables() {
        assert_eq!(seeded().tables().unwrap(), vec!["fct_race_results"]);
    }
}
