use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;

/// A tabular result: homogeneous rows keyed by the query's column aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `limit` rows, keeping every column.
    #[must_use]
    pub fn preview(&self, limit: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    /// Render one row as `col: value. col: value.`.
    #[must_use]
    pub fn row_sentence(&self, row: &[Value]) -> String {
        let parts: Vec<String> = self
            .columns
            .iter()
            .zip(row)
            .map(|(col, value)| format!("{col}: {}", cell_text(value)))
            .collect();
        format!("{}.", parts.join(". "))
    }

    /// Every row rendered with [`Self::row_sentence`], one per line.
    #[must_use]
    pub fn sentences(&self) -> String {
        self.rows
            .iter()
            .map(|row| self.row_sentence(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render as a GitHub-flavored markdown table.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if self.columns.is_empty() {
            return out;
        }
        let _ = writeln!(out, "| {} |", self.columns.join(" | "));
        let _ = writeln!(out, "|{}|", vec!["---"; self.columns.len()].join("|"));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| cell_text(v).replace('|', "\\|")).collect();
            let _ = writeln!(out, "| {} |", cells.join(" | "));
        }
        out
    }
}

/// Plain text for a single cell: strings unquoted, nulls empty.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn podium() -> RowSet {
        RowSet::new(
            vec!["athlete".into(), "place".into(), "time".into()],
            vec![
                vec![json!("KRISTIAN BLUMMENFELT"), json!(1), json!("3:34:12")],
                vec![json!("HAYDEN WILDE"), json!(2), Value::Null],
            ],
        )
    }

    #[test]
    fn row_sentence_joins_columns() {
        let rows = podium();
        assert_eq!(
            rows.row_sentence(&rows.rows[0]),
            "athlete: KRISTIAN BLUMMENFELT. place: 1. time: 3:34:12."
        );
        assert_eq!(rows.row_sentence(&rows.rows[1]), "athlete: HAYDEN WILDE. place: 2. time: .");
    }

    #[test]
    fn preview_caps_rows_and_keeps_columns() {
        let rows = podium().preview(1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.columns.len(), 3);
        assert_eq!(podium().preview(10).len(), 2);
    }

    #[test]
    fn markdown_has_header_separator_and_rows() {
        let md = podium().to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| athlete | place | time |");
        assert_eq!(lines[1], "|---|---|---|");
        assert_eq!(lines[2], "| KRISTIAN BLUMMENFELT | 1 | 3:34:12 |");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn empty_rowset_renders_nothing() {
        assert!(RowSet::empty().is_empty());
        assert_eq!(RowSet::empty().to_markdown(), "");
        assert_eq!(RowSet::empty().sentences(), "");
    }
}
