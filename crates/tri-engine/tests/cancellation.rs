//! Cancellation and per-call deadlines abandon hung calls.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tri_catalog::SchemaCatalog;
use tri_config::EngineConfig;
use tri_core::entities::{Conversation, RowSet};
use tri_core::enums::TerminalState;
use tri_engine::guard::Stage;
use tri_engine::summarizer::FALLBACK_NOTE;
use tri_engine::testing::{MemoryAuditSink, PromptKind, ScriptedModel, ScriptedWarehouse};
use tri_engine::{AskRequest, Engine, EngineError};

fn one_second() -> EngineConfig {
    EngineConfig {
        call_timeout_secs: 1,
        ..EngineConfig::default()
    }
}

fn build(model: &Arc<ScriptedModel>, warehouse: &Arc<ScriptedWarehouse>, config: EngineConfig) -> Engine {
    Engine::new(
        model.clone(),
        warehouse.clone(),
        Arc::new(MemoryAuditSink::new()),
        Arc::new(SchemaCatalog::triathlon()),
        config,
    )
}

fn rows() -> RowSet {
    RowSet::new(vec!["n".into()], vec![vec![json!(1)]])
}

#[tokio::test]
async fn cancelling_abandons_a_hung_model_call() {
    let model = Arc::new(ScriptedModel::new("fct_race_results", ["SELECT 1"]).hanging_on(PromptKind::Synthesis));
    let warehouse = Arc::new(ScriptedWarehouse::always(rows()));
    let engine = build(&model, &warehouse, EngineConfig::default());

    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    };
    let err = engine
        .ask(&AskRequest::new("Who won?"), Conversation::new(), &token)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, EngineError::Cancelled));
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn cancelled_token_makes_no_calls() {
    let model = Arc::new(ScriptedModel::new("fct_race_results", ["SELECT 1"]));
    let warehouse = Arc::new(ScriptedWarehouse::always(rows()));
    let engine = build(&model, &warehouse, EngineConfig::default());

    let token = CancellationToken::new();
    token.cancel();
    let err = engine
        .ask(&AskRequest::new("Who won?"), Conversation::new(), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Cancelled));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn hung_synthesis_hits_the_deadline() {
    let model = Arc::new(ScriptedModel::new("fct_race_results", ["SELECT 1"]).hanging_on(PromptKind::Synthesis));
    let warehouse = Arc::new(ScriptedWarehouse::always(rows()));
    let engine = build(&model, &warehouse, one_second());

    let err = engine
        .ask(&AskRequest::new("Who won?"), Conversation::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::DeadlineExceeded {
            stage: Stage::Synthesis,
            secs: 1
        }
    ));
}

#[tokio::test]
async fn hung_summary_falls_back_to_rows() {
    let model = Arc::new(ScriptedModel::new("fct_race_results", ["SELECT 1"]).hanging_on(PromptKind::Summary));
    let warehouse = Arc::new(ScriptedWarehouse::always(rows()));
    let engine = build(&model, &warehouse, one_second());

    let (response, conversation) = engine
        .ask(&AskRequest::new("Who won?"), Conversation::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.terminal_state, TerminalState::Success);
    assert!(response.answer.starts_with(FALLBACK_NOTE));
    assert!(!response.summarized);
    assert_eq!(conversation.len(), 1);
}
