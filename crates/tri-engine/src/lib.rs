//! # tri-engine
//!
//! Turns a natural-language question about triathlon results into a
//! read-only SQL query, runs it, and answers in prose.
//!
//! Each request runs a bounded loop of attempts. An attempt picks the
//! relevant tables, synthesizes a query from their schema text and the
//! conversation context, checks it is read-only, and executes it. Empty
//! results and execution errors are fed back verbatim into the next attempt;
//! an unsafe query ends the request at once. The final rows are summarized
//! by the model, and every other terminal state gets a fixed explanation.
//!
//! The engine is stateless across requests. Callers own the
//! [`Conversation`](tri_core::entities::Conversation), pass it in, and get the
//! extended value back.
//!
//! Ports:
//! - [`tri_llm::LanguageModel`] for selection, synthesis, and summaries
//! - [`tri_warehouse::Warehouse`] for execution
//! - [`tri_audit::AuditSink`] for best-effort audit records

pub mod context;
pub mod engine;
pub mod error;
pub mod executor;
pub mod guard;
pub mod retry;
pub mod safety;
pub mod selector;
pub mod summarizer;
pub mod synthesizer;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use engine::{AskRequest, Engine};
pub use error::EngineError;
pub use safety::SafetyViolation;
