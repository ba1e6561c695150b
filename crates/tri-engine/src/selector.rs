//! Table selection: ask the model which catalog tables answer the question.

use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::LazyLock;
use tri_catalog::SchemaCatalog;
use tri_llm::{LanguageModel, LlmError};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid identifier regex"));

/// Tables offered to the synthesizer for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Tables the model named, in order of first mention.
    Selected(Vec<String>),
    /// The model named no known table; every catalog table is offered.
    Fallback(Vec<String>),
}

impl Selection {
    #[must_use]
    pub fn tables(&self) -> &[String] {
        match self {
            Self::Selected(tables) | Self::Fallback(tables) => tables,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSelector<'a> {
    catalog: &'a SchemaCatalog,
    temperature: f32,
}

impl<'a> TableSelector<'a> {
    #[must_use]
    pub const fn new(catalog: &'a SchemaCatalog, temperature: f32) -> Self {
        Self {
            catalog,
            temperature,
        }
    }

    /// Selection prompt: the context plus one-line summaries only.
    #[must_use]
    pub fn prompt(&self, context: &str) -> String {
        let mut out = format!("The user asked:\n{context}\n\nAvailable tables:\n");
        for table in self.catalog.all() {
            let _ = writeln!(out, "- {}: {}", table.name, table.summary);
        }
        out.push_str(
            "\nWhich table is most relevant to answer the question? Respond with 1 (ideally) \
             or 2 (if required) table names separated by a comma.\n\
             - Only select tables that are directly relevant to the question.\n\
             - For split times in a segment, or overall race times, use fct_race_results.\n",
        );
        out
    }

    /// Recover catalog table names from free text.
    ///
    /// Never fails: unknown identifiers are dropped, duplicates collapse, and
    /// the order of first mention is kept. May return an empty list.
    #[must_use]
    pub fn parse(&self, response: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        IDENTIFIER
            .find_iter(response)
            .map(|m| m.as_str().to_ascii_lowercase())
            .filter(|name| self.catalog.contains(name))
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// One model call, parsed into a [`Selection`].
    ///
    /// # Errors
    ///
    /// Propagates the model's error; parsing itself cannot fail.
    pub async fn select(&self, model: &dyn LanguageModel, context: &str) -> Result<Selection, LlmError> {
        let response = model.complete(&self.prompt(context), self.temperature).await?;
        let tables = self.parse(&response);
        if tables.is_empty() {
            tracing::warn!(response = %response, "no known table named, offering full catalog");
            let all = self.catalog.names().into_iter().map(str::to_string).collect();
            return Ok(Selection::Fallback(all));
        }
        tracing::debug!(?tables, "tables selected");
        Ok(Selection::Selected(tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("fct_race_results", &["fct_race_results"])]
    #[case("fct_pto_scores_weekly, fct_race_results", &["fct_pto_scores_weekly", "fct_race_results"])]
    #[case("Use `FCT_RACE_RESULTS` and then fct_race_results again", &["fct_race_results"])]
    #[case("main.fct_race_segment_positions.", &["fct_race_segment_positions"])]
    #[case("fct_race_results_vs_predict", &["fct_race_results_vs_predict"])]
    #[case("fct_made_up, fct_race_results_extra", &[])]
    #[case("", &[])]
    fn parse_is_total(#[case] response: &str, #[case] expected: &[&str]) {
        let catalog = SchemaCatalog::triathlon();
        let selector = TableSelector::new(&catalog, 0.0);
        assert_eq!(selector.parse(response), expected);
    }

    #[test]
    fn parse_matches_mixed_case_catalog_names() {
        let table = |name: &str| tri_catalog::TableDescriptor {
            name: name.to_string(),
            summary: String::new(),
            schema_text: String::new(),
            join_keys: Vec::new(),
        };
        let catalog = SchemaCatalog::new(vec![table("Race_Results"), table("Athletes")], "").unwrap();
        let selector = TableSelector::new(&catalog, 0.0);
        assert_eq!(selector.parse("Race_Results, athletes"), vec!["race_results", "athletes"]);
    }

    #[test]
    fn prompt_lists_summaries_not_schemas() {
        let catalog = SchemaCatalog::triathlon();
        let prompt = TableSelector::new(&catalog, 0.0).prompt("Who won?");
        for table in catalog.all() {
            assert!(prompt.contains(&format!("- {}: {}", table.name, table.summary)));
            assert!(!prompt.contains(&table.schema_text));
        }
    }

    #[test]
    fn selection_exposes_tables() {
        let fallback = Selection::Fallback(vec!["a".into(), "b".into()]);
        assert!(fallback.is_fallback());
        assert_eq!(fallback.tables(), ["a", "b"]);
        assert!(!Selection::Selected(vec!["a".into()]).is_fallback());
    }
}
