//! Retry states, terminal states, vote types, and audit record kinds.
//!
//! All enums serialize with `snake_case` except [`VoteType`], whose stored
//! form is the upper-case `UP` / `DOWN` pair used by the feedback table.
//! [`RetryState`] provides `can_transition_to()` to enforce the bounded
//! retry loop at the engine layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// TerminalState
// ---------------------------------------------------------------------------

/// Outcome of a request after which no further attempts occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    Success,
    EmptyExhausted,
    ErrorExhausted,
    SafetyBlocked,
}

impl TerminalState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::EmptyExhausted => "empty_exhausted",
            Self::ErrorExhausted => "error_exhausted",
            Self::SafetyBlocked => "safety_blocked",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RetryState
// ---------------------------------------------------------------------------

/// State of the bounded retry loop for one request.
///
/// ```text
/// attempting(1) → attempting(2) → ... → attempting(max)
///       ↓               ↓                     ↓
///   success | safety_blocked | empty_exhausted | error_exhausted
/// ```
///
/// Exhaustion states are only reachable from the final attempt; the engine
/// enforces that bound, this type only enforces the shape of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RetryState {
    Attempting(u32),
    Success,
    EmptyExhausted,
    ErrorExhausted,
    SafetyBlocked,
}

impl RetryState {
    /// Every request starts on its first attempt.
    #[must_use]
    pub const fn initial() -> Self {
        Self::Attempting(1)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Attempting(_))
    }

    /// The terminal state this retry state represents, if any.
    #[must_use]
    pub const fn terminal(self) -> Option<TerminalState> {
        match self {
            Self::Attempting(_) => None,
            Self::Success => Some(TerminalState::Success),
            Self::EmptyExhausted => Some(TerminalState::EmptyExhausted),
            Self::ErrorExhausted => Some(TerminalState::ErrorExhausted),
            Self::SafetyBlocked => Some(TerminalState::SafetyBlocked),
        }
    }

    /// Check whether transitioning to `next` is allowed.
    ///
    /// Attempts advance one at a time; any attempt may end in a terminal
    /// state; terminal states have no successors.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Attempting(n), Self::Attempting(m)) => {
                matches!(n.checked_add(1), Some(next) if next == m)
            }
            (Self::Attempting(_), _) => true,
            _ => false,
        }
    }

    /// Transition to `next`, rejecting moves the state graph does not allow.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] for an illegal move.
    pub fn transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                entity_type: "retry_state".to_string(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attempting(_) => "attempting",
            Self::Success => "success",
            Self::EmptyExhausted => "empty_exhausted",
            Self::ErrorExhausted => "error_exhausted",
            Self::SafetyBlocked => "safety_blocked",
        }
    }
}

impl From<TerminalState> for RetryState {
    fn from(state: TerminalState) -> Self {
        match state {
            TerminalState::Success => Self::Success,
            TerminalState::EmptyExhausted => Self::EmptyExhausted,
            TerminalState::ErrorExhausted => Self::ErrorExhausted,
            TerminalState::SafetyBlocked => Self::SafetyBlocked,
        }
    }
}

impl fmt::Display for RetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempting(n) => write!(f, "attempting({n})"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// VoteType
// ---------------------------------------------------------------------------

/// User feedback on a rendered answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(CoreError::Validation(format!(
                "vote must be 'up' or 'down', got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditKind
// ---------------------------------------------------------------------------

/// The four write-only audit record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    ErrorLog,
    ZeroResultLog,
    QuestionLog,
    VoteFeedback,
}

impl AuditKind {
    pub const ALL: [Self; 4] = [
        Self::ErrorLog,
        Self::ZeroResultLog,
        Self::QuestionLog,
        Self::VoteFeedback,
    ];

    /// Table name (libSQL) and file stem (JSONL) for this record kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ErrorLog => "error_log",
            Self::ZeroResultLog => "zero_result_log",
            Self::QuestionLog => "question_log",
            Self::VoteFeedback => "vote_feedback",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_advance_one_at_a_time() {
        let s = RetryState::initial();
        assert!(s.can_transition_to(RetryState::Attempting(2)));
        assert!(!s.can_transition_to(RetryState::Attempting(3)));
        assert!(!s.can_transition_to(RetryState::Attempting(1)));
    }

    #[test]
    fn any_attempt_can_terminate() {
        for terminal in [
            RetryState::Success,
            RetryState::EmptyExhausted,
            RetryState::ErrorExhausted,
            RetryState::SafetyBlocked,
        ] {
            assert!(RetryState::Attempting(3).can_transition_to(terminal));
        }
    }

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(RetryState::Success.is_terminal());
        assert!(!RetryState::Success.can_transition_to(RetryState::Attempting(2)));
        assert!(!RetryState::SafetyBlocked.can_transition_to(RetryState::Success));

        let err = RetryState::ErrorExhausted
            .transition(RetryState::Attempting(1))
            .unwrap_err();
        assert!(err.to_string().contains("error_exhausted"));
    }

    #[test]
    fn terminal_mapping_roundtrips() {
        assert_eq!(RetryState::Attempting(4).terminal(), None);
        assert_eq!(
            RetryState::from(TerminalState::EmptyExhausted).terminal(),
            Some(TerminalState::EmptyExhausted)
        );
    }

    #[test]
    fn vote_type_parses_case_insensitively() {
        assert_eq!("UP".parse::<VoteType>().unwrap(), VoteType::Up);
        assert_eq!(" down ".parse::<VoteType>().unwrap(), VoteType::Down);
        assert!("sideways".parse::<VoteType>().is_err());
    }

    #[test]
    fn vote_type_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&VoteType::Down).unwrap(), "\"DOWN\"");
    }

    #[test]
    fn display_includes_attempt_number() {
        assert_eq!(RetryState::Attempting(2).to_string(), "attempting(2)");
        assert_eq!(TerminalState::SafetyBlocked.to_string(), "safety_blocked");
    }
}
