use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use tri_core::entities::{RowSet, cell_text};
use tri_core::responses::AskResponse;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_value_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print an answer: JSON for machines, prose plus a row table for people.
pub fn output_answer(response: &AskResponse, format: OutputFormat, preview_rows: usize) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Table => render_answer(response, preview_rows),
        other => render(response, other)?,
    };
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_answer(response: &AskResponse, preview_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", response.answer.trim());

    let status = [vec![
        response.terminal_state.to_string(),
        response.attempt_count().to_string(),
        response.rows.len().to_string(),
        response.duration_ms.to_string(),
    ]];
    let _ = writeln!(
        out,
        "{}\n",
        table::render_table(&["state", "attempts", "rows", "ms"], &status, options())
    );

    if !response.sql.is_empty() {
        let _ = writeln!(out, "SQL:\n{}\n", response.sql);
    }
    if !response.rows.is_empty() {
        let _ = writeln!(out, "{}", render_rows(&response.rows.preview(preview_rows)));
    }
    if response.large_result {
        let _ = writeln!(
            out,
            "\nNote: {} rows returned; the summary and table cover the first {preview_rows}. \
             Narrow the question for a complete answer.",
            response.rows.len()
        );
    }
    if response.audit_failures > 0 {
        let _ = writeln!(out, "\nWarning: {} audit record(s) could not be written.", response.audit_failures);
    }
    out.trim_end().to_string()
}

/// A result set as an aligned table.
pub fn render_rows(rows: &RowSet) -> String {
    let headers: Vec<&str> = rows.columns.iter().map(String::as_str).collect();
    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    table::render_table(&headers, &cells, options())
}

fn render_value_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => {
            let rows: Vec<Vec<String>> = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect();
            Ok(table::render_table(&["key", "value"], &rows, options()))
        }
        scalar => Ok(value_to_cell(&scalar)),
    }
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows: Vec<Vec<String>> = items.iter().map(|item| vec![value_to_cell(item)]).collect();
        return table::render_table(&["value"], &rows, options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect()
        })
        .collect();

    table::render_table(&header_refs, &rows, options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;
    use tri_core::entities::{AttemptOutcome, AttemptRecord, RowSet};
    use tri_core::enums::TerminalState;
    use tri_core::responses::AskResponse;

    use super::{render, render_answer};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        name: &'static str,
        value: u32,
    }

    fn response(rows: usize) -> AskResponse {
        AskResponse {
            question: "Who won?".into(),
            answer: "**ANSWER:** **JELLE GEENS** won.".into(),
            sql: "SELECT athlete_name FROM fct_race_results".into(),
            terminal_state: TerminalState::Success,
            attempts: vec![AttemptRecord::new(
                1,
                "SELECT athlete_name FROM fct_race_results",
                AttemptOutcome::Success { row_count: rows },
            )],
            rows: RowSet::new(
                vec!["athlete_name".into()],
                (0..rows).map(|i| vec![json!(format!("ATHLETE {i}"))]).collect(),
            ),
            tables: vec!["fct_race_results".into()],
            summarized: true,
            large_result: rows > 7,
            duration_ms: 42,
            audit_failures: 0,
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Example { name: "x", value: 7 };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["name"], "x");
        assert_eq!(parsed["value"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = Example { name: "x", value: 7 };
        let out = render(&value, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_for_object_is_key_value() {
        let value = Example { name: "x", value: 7 };
        let out = render(&value, OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("name"));
    }

    #[test]
    fn answer_shows_prose_sql_and_rows() {
        let out = render_answer(&response(2), 7);
        assert!(out.starts_with("**ANSWER:** **JELLE GEENS** won."));
        assert!(out.contains("SQL:\nSELECT athlete_name FROM fct_race_results"));
        assert!(out.contains("ATHLETE 1"));
        assert!(!out.contains("Note:"));
    }

    #[test]
    fn large_answers_carry_a_note_and_a_capped_table() {
        let out = render_answer(&response(9), 7);
        assert!(out.contains("ATHLETE 6"));
        assert!(!out.contains("ATHLETE 7"));
        assert!(out.contains("Note: 9 rows returned"));
    }
}
