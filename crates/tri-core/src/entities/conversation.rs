use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::RowSet;

/// One completed question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub result_rows: RowSet,
    pub query: String,
}

/// Ordered history of turns for a single user session.
///
/// The engine never holds a conversation between calls: callers pass one in
/// and receive the extended value back. Turns are only ever appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Conversation {
    #[serde(default)]
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[must_use]
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// The trailing `k` turns, oldest first. Exactly `min(k, len)` turns.
    #[must_use]
    pub fn window(&self, k: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(k);
        &self.turns[start..]
    }

    /// Return a conversation with `turn` appended.
    #[must_use]
    pub fn append(mut self, turn: ConversationTurn) -> Self {
        self.turns.push(turn);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn turn(n: usize) -> ConversationTurn {
        ConversationTurn {
            question: format!("q{n}"),
            answer: format!("a{n}"),
            result_rows: RowSet::empty(),
            query: format!("SELECT {n}"),
        }
    }

    fn conversation(len: usize) -> Conversation {
        (0..len).fold(Conversation::new(), |c, n| c.append(turn(n)))
    }

    #[rstest]
    #[case(0, 2, 0)]
    #[case(1, 2, 1)]
    #[case(2, 2, 2)]
    #[case(5, 2, 2)]
    #[case(5, 0, 0)]
    #[case(3, 10, 3)]
    fn window_is_min_of_k_and_len(#[case] len: usize, #[case] k: usize, #[case] expected: usize) {
        assert_eq!(conversation(len).window(k).len(), expected);
    }

    #[test]
    fn window_keeps_trailing_turns_in_order() {
        let c = conversation(4);
        let questions: Vec<&str> = c.window(2).iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3"]);
    }

    #[test]
    fn append_preserves_earlier_turns() {
        let c = conversation(2).append(turn(9));
        assert_eq!(c.len(), 3);
        assert_eq!(c.turns()[0].question, "q0");
        assert_eq!(c.last().map(|t| t.question.as_str()), Some("q9"));
    }

    #[test]
    fn deserializes_missing_turns_as_empty() {
        let c: Conversation = serde_json::from_str("{}").unwrap();
        assert!(c.is_empty());
    }
}
