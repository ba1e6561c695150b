//! Entity structs for the query engine's domain objects.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so they can
//! cross the CLI boundary as JSON and be validated against generated schemas.

mod attempt;
mod audit;
mod conversation;
mod filters;
mod rows;

pub use attempt::{AttemptOutcome, AttemptRecord};
pub use audit::{AuditRecord, ErrorLogEntry, QuestionLogEntry, VoteFeedbackEntry, ZeroResultLogEntry};
pub use conversation::{Conversation, ConversationTurn};
pub use filters::Filters;
pub use rows::{RowSet, cell_text};
