//! Request orchestration: context, retry loop, answer, audit, conversation.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tri_audit::AuditSink;
use tri_catalog::SchemaCatalog;
use tri_config::EngineConfig;
use tri_core::entities::{AuditRecord, Conversation, ConversationTurn, Filters, QuestionLogEntry, VoteFeedbackEntry};
use tri_core::enums::{TerminalState, VoteType};
use tri_core::responses::{AskResponse, VoteResponse};
use tri_llm::LanguageModel;
use tri_warehouse::Warehouse;

use crate::context::ContextAssembler;
use crate::error::EngineError;
use crate::guard::{CallGuard, Stage};
use crate::retry::{RetryController, RetryOutcome, write_audit};
use crate::summarizer::{self, ResultSummarizer};

/// One user question plus the caller's structured filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    pub filters: Filters,
    /// Whether prior turns should be surfaced to the model.
    pub is_follow_up: bool,
}

impl AskRequest {
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub const fn follow_up(mut self, is_follow_up: bool) -> Self {
        self.is_follow_up = is_follow_up;
        self
    }
}

/// The question-answering engine.
///
/// Holds only its ports, the catalog, and configuration; no per-session
/// state. Share it behind an `Arc` across concurrent sessions.
pub struct Engine {
    model: Arc<dyn LanguageModel>,
    warehouse: Arc<dyn Warehouse>,
    audit: Arc<dyn AuditSink>,
    catalog: Arc<SchemaCatalog>,
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(
        model: Arc<dyn LanguageModel>,
        warehouse: Arc<dyn Warehouse>,
        audit: Arc<dyn AuditSink>,
        catalog: Arc<SchemaCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            model,
            warehouse,
            audit,
            catalog,
            config,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn guard(&self, cancel: &CancellationToken) -> CallGuard {
        CallGuard::new(cancel.clone(), Duration::from_secs(self.config.call_timeout_secs))
    }

    /// Answer one question.
    ///
    /// Takes the conversation by value and returns it extended by exactly one
    /// turn, whatever the terminal state.
    ///
    /// # Errors
    ///
    /// [`EngineError::Cancelled`] or [`EngineError::DeadlineExceeded`] when a
    /// call is abandoned, and [`EngineError::SynthesisAmbiguous`] under the
    /// `fail` selection policy. Failed attempts are reported in the response,
    /// not as errors.
    pub async fn ask(
        &self,
        request: &AskRequest,
        conversation: Conversation,
        cancel: &CancellationToken,
    ) -> Result<(AskResponse, Conversation), EngineError> {
        let started = Instant::now();
        let guard = self.guard(cancel);
        let question = request.question.trim();
        tracing::info!(question, follow_up = request.is_follow_up, "ask");

        let base_context = ContextAssembler::new(self.config.context_turns, self.config.context_preview_rows)
            .assemble(question, &request.filters, &conversation, request.is_follow_up);

        let controller = RetryController {
            model: self.model.as_ref(),
            warehouse: self.warehouse.as_ref(),
            audit: self.audit.as_ref(),
            catalog: &self.catalog,
            config: &self.config,
            guard: &guard,
        };
        let outcome = controller.run(question, &base_context).await?;

        let history = if request.is_follow_up {
            conversation.turns()
        } else {
            &[]
        };
        let (answer, summarized) = self.answer(question, &outcome, history, &guard).await?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut audit_failures = outcome.audit_failures;
        if outcome.state != TerminalState::SafetyBlocked {
            let summary = if outcome.state.is_success() {
                answer.clone()
            } else {
                String::new()
            };
            let record = AuditRecord::QuestionLog(QuestionLogEntry {
                question: question.to_string(),
                generated_sql: outcome.query.clone(),
                summary,
                is_follow_up: request.is_follow_up,
                previous_question: conversation.last().map(|t| t.question.clone()),
                attempts: u32::try_from(outcome.log.len()).unwrap_or(u32::MAX),
                duration_ms,
                timestamp: Utc::now(),
            });
            if !write_audit(self.audit.as_ref(), &guard, &record).await? {
                audit_failures += 1;
            }
        }

        let large_result = outcome.rows.len() > self.config.summary_preview_rows;
        if large_result {
            tracing::info!(rows = outcome.rows.len(), "large result, summary saw a preview only");
        }

        let conversation = conversation.append(ConversationTurn {
            question: question.to_string(),
            answer: answer.clone(),
            result_rows: outcome.rows.clone(),
            query: outcome.query.clone(),
        });

        tracing::info!(
            state = %outcome.state,
            attempts = outcome.log.len(),
            duration_ms,
            audit_failures,
            "request finished"
        );

        let response = AskResponse {
            question: question.to_string(),
            answer,
            sql: outcome.query,
            terminal_state: outcome.state,
            attempts: outcome.log.into_records(),
            rows: outcome.rows,
            tables: outcome.tables,
            summarized,
            large_result,
            duration_ms,
            audit_failures,
        };
        Ok((response, conversation))
    }

    /// Summary on success, a canned message otherwise. The bool is whether
    /// the model wrote the answer.
    async fn answer(
        &self,
        question: &str,
        outcome: &RetryOutcome,
        history: &[ConversationTurn],
        guard: &CallGuard,
    ) -> Result<(String, bool), EngineError> {
        let attempts = outcome.log.len();
        match outcome.state {
            TerminalState::Success => {
                let summarizer = ResultSummarizer::new(
                    self.config.summary_preview_rows,
                    self.config.summary_history_turns,
                    self.config.summary_temperature,
                );
                let call = summarizer.summarize(self.model.as_ref(), question, &outcome.query, &outcome.rows, history);
                match guard.run(Stage::Summary, call).await {
                    Ok(Ok(summary)) => Ok((summary, true)),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "summary failed, returning raw rows");
                        Ok((summarizer::raw_rows(&outcome.rows), false))
                    }
                    Err(EngineError::DeadlineExceeded { .. }) => {
                        Ok((summarizer::raw_rows(&outcome.rows), false))
                    }
                    Err(e) => Err(e),
                }
            }
            TerminalState::ErrorExhausted => Ok((
                summarizer::error_exhausted(question, attempts, &outcome.log.error_messages()),
                false,
            )),
            TerminalState::EmptyExhausted => Ok((summarizer::empty_exhausted(question, attempts), false)),
            TerminalState::SafetyBlocked => Ok((
                summarizer::safety_blocked(question, outcome.safety_reason().unwrap_or("unsafe query")),
                false,
            )),
        }
    }

    /// Record a vote on the conversation's latest answer.
    ///
    /// # Errors
    ///
    /// [`EngineError::NothingToVoteOn`] for an empty conversation. A failed
    /// audit write is reported through `recorded`, not as an error.
    pub async fn record_vote(
        &self,
        vote: VoteType,
        conversation: &Conversation,
        cancel: &CancellationToken,
    ) -> Result<VoteResponse, EngineError> {
        let turn = conversation.last().ok_or(EngineError::NothingToVoteOn)?;
        let record = AuditRecord::VoteFeedback(VoteFeedbackEntry {
            vote_type: vote,
            question: turn.question.clone(),
            summary: turn.answer.clone(),
            timestamp: Utc::now(),
        });
        let recorded = write_audit(self.audit.as_ref(), &self.guard(cancel), &record).await?;
        tracing::info!(vote = %vote, recorded, "vote");
        Ok(VoteResponse {
            vote_type: vote,
            question: turn.question.clone(),
            recorded,
        })
    }
}
