//! Scripted ports for driving the engine deterministically.
//!
//! Each fake replays a queue of canned responses and records what it was
//! asked. When a queue runs dry the last response repeats.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tri_audit::{AuditError, AuditSink};
use tri_core::entities::{AuditRecord, RowSet};
use tri_core::enums::AuditKind;
use tri_llm::{LanguageModel, LlmError};
use tri_warehouse::{Warehouse, WarehouseError};

/// Which engine step a prompt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Selection,
    Synthesis,
    Summary,
}

impl PromptKind {
    /// Recognise a prompt by the fixed header each step opens with.
    #[must_use]
    pub fn classify(prompt: &str) -> Self {
        if prompt.starts_with("The user asked:") {
            Self::Selection
        } else if prompt.starts_with("You are an assistant that summarizes") {
            Self::Summary
        } else {
            Self::Synthesis
        }
    }
}

/// Replay queue with a sticky last element.
#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<T>,
    last: Option<T>,
}

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            queue: items.into_iter().collect(),
            last: None,
        }
    }

    fn next(&mut self) -> Option<T> {
        if let Some(item) = self.queue.pop_front() {
            self.last = Some(item.clone());
        }
        self.last.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A recorded model call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCall {
    pub kind: PromptKind,
    pub prompt: String,
    pub temperature: f32,
}

/// Language model replaying one script per prompt kind. `Err` entries fail
/// the call with an API error carrying the text.
#[derive(Debug)]
pub struct ScriptedModel {
    selection: Mutex<Script<Result<String, String>>>,
    synthesis: Mutex<Script<Result<String, String>>>,
    summary: Mutex<Script<Result<String, String>>>,
    hang: Option<PromptKind>,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    /// Selection always names `table`, summaries echo a fixed answer, and
    /// synthesis replays `queries` in order.
    #[must_use]
    pub fn new<I, S>(table: &str, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selection: Mutex::new(Script::new([Ok(table.to_string())])),
            synthesis: Mutex::new(Script::new(queries.into_iter().map(|q| Ok(q.into())))),
            summary: Mutex::new(Script::new([Ok("**ANSWER:** scripted summary".to_string())])),
            hang: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_selection(self, replies: impl IntoIterator<Item = Result<String, String>>) -> Self {
        *lock(&self.selection) = Script::new(replies);
        self
    }

    #[must_use]
    pub fn with_synthesis(self, replies: impl IntoIterator<Item = Result<String, String>>) -> Self {
        *lock(&self.synthesis) = Script::new(replies);
        self
    }

    #[must_use]
    pub fn with_summary(self, reply: Result<String, String>) -> Self {
        *lock(&self.summary) = Script::new([reply]);
        self
    }

    /// Never answer prompts of `kind`.
    #[must_use]
    pub fn hanging_on(mut self, kind: PromptKind) -> Self {
        self.hang = Some(kind);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ModelCall> {
        lock(&self.calls).clone()
    }

    /// Prompts of one kind, in call order.
    #[must_use]
    pub fn prompts(&self, kind: PromptKind) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.prompt.clone())
            .collect()
    }

    #[must_use]
    pub fn call_count(&self, kind: PromptKind) -> usize {
        lock(&self.calls).iter().filter(|c| c.kind == kind).count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let kind = PromptKind::classify(prompt);
        lock(&self.calls).push(ModelCall {
            kind,
            prompt: prompt.to_string(),
            temperature,
        });
        if self.hang == Some(kind) {
            std::future::pending::<()>().await;
        }
        let script = match kind {
            PromptKind::Selection => &self.selection,
            PromptKind::Synthesis => &self.synthesis,
            PromptKind::Summary => &self.summary,
        };
        let reply = lock(script).next();
        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Api { status: 500, message }),
            None => Err(LlmError::EmptyCompletion),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Warehouse replaying results in order. `Err` entries fail the statement
/// with the text as the warehouse message.
#[derive(Debug)]
pub struct ScriptedWarehouse {
    script: Mutex<Script<Result<RowSet, String>>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedWarehouse {
    #[must_use]
    pub fn new(results: impl IntoIterator<Item = Result<RowSet, String>>) -> Self {
        Self {
            script: Mutex::new(Script::new(results)),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Every statement returns `rows`.
    #[must_use]
    pub fn always(rows: RowSet) -> Self {
        Self::new([Ok(rows)])
    }

    /// Statements received, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        lock(&self.executed).clone()
    }
}

#[async_trait]
impl Warehouse for ScriptedWarehouse {
    async fn execute(&self, query: &str) -> Result<RowSet, WarehouseError> {
        lock(&self.executed).push(query.to_string());
        let next = lock(&self.script).next();
        match next {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(WarehouseError::Statement(message)),
            None => Ok(RowSet::empty()),
        }
    }
}

/// Audit sink keeping records in memory, optionally failing every write.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
    failing: bool,
}

impl MemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        lock(&self.records).clone()
    }

    #[must_use]
    pub fn of_kind(&self, kind: AuditKind) -> Vec<AuditRecord> {
        lock(&self.records)
            .iter()
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: AuditKind) -> usize {
        lock(&self.records).iter().filter(|r| r.kind() == kind).count()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        if self.failing {
            return Err(AuditError::Io(std::io::Error::other("audit store unavailable")));
        }
        lock(&self.records).push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::TableSelector;
    use crate::summarizer::ResultSummarizer;
    use crate::synthesizer::QuerySynthesizer;
    use tri_catalog::SchemaCatalog;

    const EARLIER_ANSWER: &str = "**ANSWER:** **JELLE GEENS** won.\n\n**LOGIC USED:** Filtered on place 1.";

    #[test]
    fn prompts_quoting_an_earlier_summary_keep_their_kind() {
        let catalog = SchemaCatalog::triathlon();
        let context = format!(
            "[Conversation So Far]\nPrevious answer:\n{EARLIER_ANSWER}\n---\n\nWhich table is most relevant here?"
        );
        let tables = vec!["fct_race_results".to_string()];

        let selection = TableSelector::new(&catalog, 0.0).prompt(&context);
        let synthesis = QuerySynthesizer::new(&catalog, 0.2).prompt(&tables, &context);
        let summary = ResultSummarizer::new(7, 3, 0.2).prompt("Who won?", "SELECT 1", &RowSet::empty(), &[]);

        assert_eq!(PromptKind::classify(&selection), PromptKind::Selection);
        assert_eq!(PromptKind::classify(&synthesis), PromptKind::Synthesis);
        assert_eq!(PromptKind::classify(&summary), PromptKind::Summary);
    }
}
