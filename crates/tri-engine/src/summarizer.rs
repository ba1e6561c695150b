//! Final answer text: a model-written summary on success, a fixed message
//! for every other terminal state.

use std::fmt::Write as _;
use tri_core::entities::{ConversationTurn, RowSet};
use tri_llm::{LanguageModel, LlmError};

/// Prefixed to the raw table when the model could not summarize.
pub const FALLBACK_NOTE: &str =
    "A written summary could not be generated for this result. Here are the rows the query returned:";

#[derive(Debug, Clone, Copy)]
pub struct ResultSummarizer {
    preview_rows: usize,
    history_turns: usize,
    temperature: f32,
}

impl ResultSummarizer {
    #[must_use]
    pub const fn new(preview_rows: usize, history_turns: usize, temperature: f32) -> Self {
        Self {
            preview_rows,
            history_turns,
            temperature,
        }
    }

    #[must_use]
    pub fn prompt(&self, question: &str, sql: &str, rows: &RowSet, history: &[ConversationTurn]) -> String {
        let start = history.len().saturating_sub(self.history_turns);
        let mut previous = String::new();
        for turn in &history[start..] {
            let _ = writeln!(previous, "Previous user question: '{}'", turn.question);
            let _ = writeln!(previous, "Previous assistant answer: '{}'", turn.answer);
            previous.push_str("---\n");
        }

        format!(
            "You are an assistant that summarizes triathlon race results.\n\n\
             {previous}Current user question: \"{question}\"\n\
             SQL used to retrieve the data:\n```sql\n{sql}\n```\n\
             Results:\n{results}\n\n\
             If the prior conversation used filters (athlete names, race years, genders, \
             distances, or organizers), keep them when answering this follow-up even if the \
             user does not repeat them. Do not invent filters.\n\n\
             Reply in this format:\n\n\
             **ANSWER:** 1-3 sentences in a plain analytical tone. One sentence is fine for a \
             single word or number.\n\n\
             **LOGIC USED:** 1-2 sentences explaining how the SQL answered the question: the \
             filters, joins, and columns used, including any specific dates.\n\n\
             Bold these in Markdown (`**name**`) wherever they appear:\n\
             - Athlete names\n\
             - Finish times (e.g. 1:25:30)\n\
             - Country names\n\
             - Finishing places (1st, 2nd, 3rd)\n",
            results = rows.preview(self.preview_rows).sentences(),
        )
    }

    /// One model call over at most `preview_rows` rows.
    ///
    /// # Errors
    ///
    /// Propagates the model's error; callers fall back to [`raw_rows`].
    pub async fn summarize(
        &self,
        model: &dyn LanguageModel,
        question: &str,
        sql: &str,
        rows: &RowSet,
        history: &[ConversationTurn],
    ) -> Result<String, LlmError> {
        let reply = model
            .complete(&self.prompt(question, sql, rows, history), self.temperature)
            .await?;
        Ok(reply.trim().to_string())
    }
}

/// Answer shown when summarization fails: the rows as a markdown table.
#[must_use]
pub fn raw_rows(rows: &RowSet) -> String {
    format!("{FALLBACK_NOTE}\n\n{}", rows.to_markdown())
}

/// Answer for a request whose every attempt failed to execute.
#[must_use]
pub fn error_exhausted(question: &str, attempts: usize, errors: &[&str]) -> String {
    let mut out = format!(
        "Query failed after {attempts} attempts.\n\nQuestion: {question}\n\nErrors encountered:\n"
    );
    for (n, error) in errors.iter().enumerate() {
        let _ = writeln!(out, "{}. {error}", n + 1);
    }
    out.push_str("\nTry rephrasing the question or naming the table or columns you are interested in.");
    out
}

/// Answer for a request whose every attempt returned no rows.
#[must_use]
pub fn empty_exhausted(question: &str, attempts: usize) -> String {
    format!(
        "No results found for your question after {attempts} attempts.\n\n\
         Question: {question}\n\n\
         The filters may be too narrow. Try relaxing them, for example by removing the \
         country, gender, or birth year constraints, or by widening the date range."
    )
}

/// Answer for a request stopped by the safety check.
#[must_use]
pub fn safety_blocked(question: &str, reason: &str) -> String {
    format!(
        "Query blocked for safety.\n\nQuestion: {question}\n\n\
         Reason: {reason}. Only read-only queries are run against the warehouse."
    )
}
