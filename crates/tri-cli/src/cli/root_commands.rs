use clap::{Args, Subcommand};
use std::path::PathBuf;
use tri_core::entities::Filters;
use tri_core::enums::VoteType;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Ask one question.
    Ask(AskArgs),
    /// Interactive question loop; every question after the first is a follow-up.
    Chat(ChatArgs),
    /// Vote on the latest answer in a session.
    Vote(VoteArgs),
    /// List queryable tables, or show one table's schema.
    Catalog(CatalogArgs),
    /// Check whether a query passes the read-only safety rules.
    CheckSql(CheckSqlArgs),
    /// Load a CSV file into the warehouse as a table.
    Load(LoadArgs),
    /// Show the effective configuration (secrets redacted).
    Config,
}

#[derive(Clone, Debug, Args)]
pub struct AskArgs {
    /// The question, in plain language.
    pub question: String,

    /// Athlete name filter.
    #[arg(long)]
    pub athlete: Option<String>,

    /// Race distance filter, e.g. "Half-Iron (70.3 miles)".
    #[arg(long)]
    pub distance: Option<String>,

    /// Gender filter: men or women.
    #[arg(long)]
    pub gender: Option<String>,

    /// Race organizer filter, e.g. t100.
    #[arg(long)]
    pub organizer: Option<String>,

    /// Conversation file to read from and append to.
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Show earlier turns of the session to the model.
    #[arg(long)]
    pub follow_up: bool,
}

impl AskArgs {
    #[must_use]
    pub fn filters(&self) -> Filters {
        Filters {
            athlete: self.athlete.clone(),
            distance: self.distance.clone(),
            gender: self.gender.clone(),
            organizer: self.organizer.clone(),
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ChatArgs {
    /// Conversation file to resume and keep up to date.
    #[arg(long)]
    pub session: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct VoteArgs {
    /// up or down
    pub vote: VoteType,

    /// Conversation file holding the answer being voted on.
    #[arg(long)]
    pub session: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct CatalogArgs {
    /// Table to describe.
    pub table: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckSqlArgs {
    /// The SQL text to check.
    pub sql: String,
}

#[derive(Clone, Debug, Args)]
pub struct LoadArgs {
    /// Destination table name.
    pub table: String,

    /// CSV file to read.
    pub csv: PathBuf,
}
