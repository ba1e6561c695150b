//! Retry loop, context window, and prompt temperature settings.

use serde::{Deserialize, Serialize};

const fn default_max_attempts() -> u32 {
    5
}

const fn default_context_turns() -> usize {
    2
}

const fn default_context_preview_rows() -> usize {
    5
}

const fn default_summary_preview_rows() -> usize {
    7
}

const fn default_summary_history_turns() -> usize {
    2
}

const fn default_selection_temperature() -> f32 {
    0.0
}

/// Low but nonzero so a retry can escape a repeated failure.
const fn default_synthesis_temperature() -> f32 {
    0.2
}

const fn default_summary_temperature() -> f32 {
    0.2
}

const fn default_call_timeout_secs() -> u64 {
    60
}

/// What table selection does when the model names no known table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionFallback {
    /// Offer every catalog table to the synthesizer.
    #[default]
    AllTables,
    /// Fail the request as ambiguous.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Upper bound on synthesize/validate/execute cycles per request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Prior turns surfaced to the model (K).
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Result rows shown per prior turn in the synthesis context.
    #[serde(default = "default_context_preview_rows")]
    pub context_preview_rows: usize,

    /// Result rows handed to the summarizer. Larger results are flagged.
    #[serde(default = "default_summary_preview_rows")]
    pub summary_preview_rows: usize,

    /// Prior turns surfaced to the summarizer.
    #[serde(default = "default_summary_history_turns")]
    pub summary_history_turns: usize,

    #[serde(default = "default_selection_temperature")]
    pub selection_temperature: f32,

    #[serde(default = "default_synthesis_temperature")]
    pub synthesis_temperature: f32,

    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,

    /// Deadline for each individual model or warehouse call, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    #[serde(default)]
    pub selection_fallback: SelectionFallback,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            context_turns: default_context_turns(),
            context_preview_rows: default_context_preview_rows(),
            summary_preview_rows: default_summary_preview_rows(),
            summary_history_turns: default_summary_history_turns(),
            selection_temperature: default_selection_temperature(),
            synthesis_temperature: default_synthesis_temperature(),
            summary_temperature: default_summary_temperature(),
            call_timeout_secs: default_call_timeout_secs(),
            selection_fallback: SelectionFallback::default(),
        }
    }
}

impl EngineConfig {
    pub(crate) fn check(&self) -> Result<(), (&'static str, String)> {
        if self.max_attempts == 0 {
            return Err(("engine.max_attempts", "must be at least 1".into()));
        }
        if self.context_turns > 10 {
            return Err(("engine.context_turns", "must be 10 or fewer".into()));
        }
        if self.call_timeout_secs == 0 {
            return Err(("engine.call_timeout_secs", "must be at least 1".into()));
        }
        for (field, value) in [
            ("engine.selection_temperature", self.selection_temperature),
            ("engine.synthesis_temperature", self.synthesis_temperature),
            ("engine.summary_temperature", self.summary_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err((field, format!("{value} is outside 0.0..=2.0")));
            }
        }
        Ok(())
    }
}
