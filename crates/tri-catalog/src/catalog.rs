use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::CatalogError;

/// One queryable table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    /// One line, shown during table selection.
    pub summary: String,
    /// Columns, semantics, and example fragments, shown during synthesis.
    pub schema_text: String,
    pub join_keys: Vec<String>,
}

/// Immutable, ordered set of table descriptors plus dialect guidelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: Vec<TableDescriptor>,
    guidelines: String,
    version: u32,
}

impl SchemaCatalog {
    /// Build a custom catalog.
    ///
    /// # Errors
    ///
    /// Rejects an empty table list and duplicate table names. Names are
    /// stored lower-case, so duplicates differing only in case are rejected.
    pub fn new(mut tables: Vec<TableDescriptor>, guidelines: impl Into<String>) -> Result<Self, CatalogError> {
        if tables.is_empty() {
            return Err(CatalogError::Empty);
        }
        for table in &mut tables {
            table.name.make_ascii_lowercase();
        }
        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name.as_str()) {
                return Err(CatalogError::DuplicateTable(table.name.clone()));
            }
        }
        Ok(Self::from_parts(tables, guidelines.into(), 0))
    }

    pub(crate) const fn from_parts(tables: Vec<TableDescriptor>, guidelines: String, version: u32) -> Self {
        Self {
            tables,
            guidelines,
            version,
        }
    }

    #[must_use]
    pub fn describe(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Like [`Self::describe`] but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&TableDescriptor, CatalogError> {
        self.describe(name)
            .ok_or_else(|| CatalogError::UnknownTable(name.to_string()))
    }

    /// Table name → one-line summary.
    #[must_use]
    pub fn summaries(&self) -> BTreeMap<&str, &str> {
        self.tables
            .iter()
            .map(|t| (t.name.as_str(), t.summary.as_str()))
            .collect()
    }

    /// Table names in catalog order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.describe(name).is_some()
    }

    #[must_use]
    pub fn all(&self) -> &[TableDescriptor] {
        &self.tables
    }

    #[must_use]
    pub fn guidelines(&self) -> &str {
        &self.guidelines
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn table(name: &str) -> TableDescriptor {
        TableDescriptor {
            name: name.to_string(),
            summary: format!("{name} summary"),
            schema_text: format!("Table `{name}`"),
            join_keys: vec!["athlete_slug".into()],
        }
    }

    #[test]
    fn new_rejects_empty() {
        assert!(matches!(SchemaCatalog::new(vec![], ""), Err(CatalogError::Empty)));
    }

    #[test]
    fn new_rejects_duplicates() {
        let err = SchemaCatalog::new(vec![table("a"), table("b"), table("a")], "").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTable(name) if name == "a"));
    }

    #[test]
    fn new_lowercases_table_names() {
        let catalog = SchemaCatalog::new(vec![table("Dim_Races")], "guidelines").unwrap();
        assert_eq!(catalog.names(), vec!["dim_races"]);
        assert!(catalog.contains("dim_races"));

        let err = SchemaCatalog::new(vec![table("RACES"), table("races")], "g").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTable(name) if name == "races"));
    }

    #[test]
    fn summaries_cover_every_table() {
        let catalog = SchemaCatalog::new(vec![table("b"), table("a")], "rules").unwrap();
        let summaries = catalog.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries["a"], "a summary");
        assert_eq!(catalog.names(), vec!["b", "a"]);
        assert_eq!(catalog.guidelines(), "rules");
    }

    #[rstest]
    #[case("fct_race_results", true)]
    #[case("fct_pto_scores_weekly", true)]
    #[case("fct_race_segment_positions", true)]
    #[case("fct_race_results_vs_predict", true)]
    #[case("fct_imaginary", false)]
    #[case("", false)]
    fn triathlon_describe(#[case] name: &str, #[case] known: bool) {
        let catalog = SchemaCatalog::triathlon();
        assert_eq!(catalog.describe(name).is_some(), known);
        assert_eq!(catalog.require(name).is_ok(), known);
    }

    #[test]
    fn triathlon_has_four_versioned_tables() {
        let catalog = SchemaCatalog::triathlon();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.version(), crate::CATALOG_VERSION);
        assert!(catalog.all().iter().all(|t| t.join_keys.contains(&"unique_race_id".to_string())));
    }
}
