//! Query synthesis from guidelines, selected schema text, and context.

use tri_catalog::SchemaCatalog;
use tri_llm::{LanguageModel, LlmError};

/// Fence language tags stripped from the opening fence.
const FENCE_TAGS: &[&str] = &["sql", "duckdb", "postgres", "postgresql", "sqlite", "bigquery", "googlesql"];

#[derive(Debug, Clone, Copy)]
pub struct QuerySynthesizer<'a> {
    catalog: &'a SchemaCatalog,
    temperature: f32,
}

impl<'a> QuerySynthesizer<'a> {
    #[must_use]
    pub const fn new(catalog: &'a SchemaCatalog, temperature: f32) -> Self {
        Self {
            catalog,
            temperature,
        }
    }

    /// Guidelines, then the schema text of `tables` only, then the context.
    #[must_use]
    pub fn prompt(&self, tables: &[String], context: &str) -> String {
        let schemas: Vec<&str> = tables
            .iter()
            .filter_map(|name| self.catalog.describe(name))
            .map(|table| table.schema_text.trim())
            .collect();
        format!(
            "{}\n\n{}\n\nUser question:\n{context}\n\n\
             Generate one valid SQL query using only the columns documented above. \
             Do not include explanations, comments, or markdown. Return SQL only.",
            self.catalog.guidelines().trim(),
            schemas.join("\n\n"),
        )
    }

    /// One model call; the reply with any code fence removed.
    ///
    /// # Errors
    ///
    /// Propagates the model's error. There is no retry at this layer.
    pub async fn synthesize(
        &self,
        model: &dyn LanguageModel,
        tables: &[String],
        context: &str,
    ) -> Result<String, LlmError> {
        let reply = model.complete(&self.prompt(tables, context), self.temperature).await?;
        Ok(strip_code_fence(&reply))
    }
}

/// Return the body of the first fenced block, or the trimmed text if there
/// is no fence.
#[must_use]
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed.to_string();
    };
    let body = strip_fence_tag(&trimmed[open + 3..]);
    let body = body.find("```").map_or(body, |close| &body[..close]);
    body.trim().to_string()
}

fn strip_fence_tag(after_fence: &str) -> &str {
    let tag_len = after_fence
        .bytes()
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    let (tag, rest) = after_fence.split_at(tag_len);
    let known = FENCE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag));
    let separated = rest.is_empty() || rest.starts_with(char::is_whitespace);
    if known && separated { rest } else { after_fence }
}
