//! The built-in four-table triathlon catalog.

use crate::catalog::{SchemaCatalog, TableDescriptor};

/// Bumped whenever a table description or the guidelines change.
pub const CATALOG_VERSION: u32 = 1;

const GUIDELINES: &str = include_str!("../tables/guidelines.md");

const JOIN_KEYS: [&str; 2] = ["athlete_slug", "unique_race_id"];

const TABLES: [(&str, &str, &str); 4] = [
    (
        "fct_race_results",
        "Race-day performance results for athletes (one row per race entry). Use for finishing times, athlete info, podiums.",
        include_str!("../tables/fct_race_results.md"),
    ),
    (
        "fct_race_results_vs_predict",
        "Comparison between predicted and actual results. Use for performance deltas and prediction accuracy.",
        include_str!("../tables/fct_race_results_vs_predict.md"),
    ),
    (
        "fct_pto_scores_weekly",
        "Weekly PTO scores by athlete. Use for rank changes or discipline scores over time, and to compare athletes to each other or to themselves.",
        include_str!("../tables/fct_pto_scores_weekly.md"),
    ),
    (
        "fct_race_segment_positions",
        "Rank and time progression through swim, bike, run segments. Use for mid-race dynamics and position shifts during legs or transitions.",
        include_str!("../tables/fct_race_segment_positions.md"),
    ),
];

impl SchemaCatalog {
    /// The catalog of triathlon fact tables.
    #[must_use]
    pub fn triathlon() -> Self {
        let tables = TABLES
            .iter()
            .map(|(name, summary, schema)| TableDescriptor {
                name: (*name).to_string(),
                summary: (*summary).to_string(),
                schema_text: schema.trim().to_string(),
                join_keys: JOIN_KEYS.iter().map(|k| (*k).to_string()).collect(),
            })
            .collect();
        Self::from_parts(tables, GUIDELINES.trim().to_string(), CATALOG_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_passes_validation() {
        let builtin = SchemaCatalog::triathlon();
        let rebuilt = SchemaCatalog::new(builtin.all().to_vec(), builtin.guidelines())
            .expect("built-in catalog is valid");
        assert_eq!(rebuilt.names(), builtin.names());
    }

    #[test]
    fn every_schema_text_names_its_table() {
        for table in SchemaCatalog::triathlon().all() {
            assert!(
                table.schema_text.contains(&format!("`{}`", table.name)),
                "{} schema text does not name the table",
                table.name
            );
        }
    }

    #[test]
    fn guidelines_are_loaded() {
        assert!(SchemaCatalog::triathlon().guidelines().contains("DuckDB"));
    }
}
