//! Audit sink configuration.

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".tri/audit.db".to_string()
}

fn default_trail_dir() -> String {
    ".tri/audit".to_string()
}

/// Where audit records are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBackend {
    /// Local libSQL database with one table per record kind.
    Libsql,
    /// One JSONL file per record kind.
    #[default]
    Jsonl,
    /// Discard every record.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub backend: AuditBackend,

    /// Database file for the `libsql` backend.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Directory for the `jsonl` backend.
    #[serde(default = "default_trail_dir")]
    pub trail_dir: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::default(),
            db_path: default_db_path(),
            trail_dir: default_trail_dir(),
        }
    }
}

impl AuditConfig {
    pub fn is_enabled(&self) -> bool {
        self.backend != AuditBackend::None
    }
}
