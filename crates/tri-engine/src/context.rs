//! Base synthesis context for one request.

use std::fmt::Write as _;
use tri_core::entities::{Conversation, ConversationTurn, Filters};

const FOLLOW_UP_INSTRUCTION: &str = "If the conversation above used filters (athlete names, race years, \
genders, distances, or organizers), keep applying them to this question unless the user \
changes them. Do not invent filters that were never used.";

const UPPERCASE_NOTE: &str = "Note: athlete names (`athlete_name`) are stored in UPPERCASE.";

/// Renders the question, filters, and a bounded window of prior turns into
/// the text every attempt starts from.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    turns: usize,
    preview_rows: usize,
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(turns: usize, preview_rows: usize) -> Self {
        Self {
            turns,
            preview_rows,
        }
    }

    /// Build the base context. Pure: the same inputs give the same text.
    #[must_use]
    pub fn assemble(
        &self,
        question: &str,
        filters: &Filters,
        conversation: &Conversation,
        is_follow_up: bool,
    ) -> String {
        let window = if is_follow_up {
            conversation.window(self.turns)
        } else {
            &[]
        };

        let mut out = String::new();
        if !window.is_empty() {
            out.push_str("[Conversation So Far]\n");
            let blocks: Vec<String> = window.iter().map(|turn| self.render_turn(turn)).collect();
            out.push_str(&blocks.join("---\n"));
            out.push_str("---\n\n");
        }

        out.push_str(question.trim());
        out.push_str("\n\n");

        if !window.is_empty() {
            out.push_str(FOLLOW_UP_INSTRUCTION);
            out.push_str("\n\n");
        }

        out.push_str("[Contextual Filters Applied]");
        let annotations = filters.annotations();
        if annotations.is_empty() {
            out.push_str(" None");
        } else {
            for (key, value) in annotations {
                let _ = write!(out, "\n- {key}: {value}");
            }
        }
        out.push_str("\n\n");
        out.push_str(UPPERCASE_NOTE);
        out
    }

    fn render_turn(&self, turn: &ConversationTurn) -> String {
        let preview = turn.result_rows.preview(self.preview_rows);
        let rows = if preview.is_empty() {
            "(no rows)".to_string()
        } else {
            preview.sentences()
        };
        format!(
            "Previous question: {}\nPrevious answer: {}\nPrevious query:\n{}\nPrevious results (first {} rows):\n{}\n",
            turn.question, turn.answer, turn.query, self.preview_rows, rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tri_core::entities::RowSet;

    fn turn(n: usize, rows: usize) -> ConversationTurn {
        ConversationTurn {
            question: format!("question {n}"),
            answer: format!("answer {n}"),
            result_rows: RowSet::new(
                vec!["athlete_name".into(), "place".into()],
                (0..rows).map(|i| vec![json!(format!("ATHLETE {i}")), json!(i + 1)]).collect(),
            ),
            query: format!("SELECT {n}"),
        }
    }

    fn history(len: usize) -> Conversation {
        (1..=len).fold(Conversation::new(), |c, n| c.append(turn(n, 1)))
    }

    #[test]
    fn fresh_question_has_no_history_block() {
        let ctx = ContextAssembler::new(2, 5).assemble(
            "Who won Kona in 2024?",
            &Filters::default(),
            &Conversation::new(),
            false,
        );
        assert_eq!(
            ctx,
            "Who won Kona in 2024?\n\n[Contextual Filters Applied] None\n\n\
             Note: athlete names (`athlete_name`) are stored in UPPERCASE."
        );
    }

    #[test]
    fn filters_render_as_bullets() {
        let filters = Filters {
            athlete: Some("LUCY CHARLES-BARCLAY".into()),
            gender: Some("women".into()),
            ..Filters::default()
        };
        let ctx = ContextAssembler::new(2, 5).assemble("Best swim?", &filters, &Conversation::new(), false);
        assert!(ctx.contains(
            "[Contextual Filters Applied]\n- athlete_name: LUCY CHARLES-BARCLAY\n- athlete_gender: women\n\n"
        ));
    }

    #[test]
    fn history_ignored_unless_follow_up() {
        let ctx = ContextAssembler::new(2, 5).assemble("And in 2023?", &Filters::default(), &history(3), false);
        assert!(!ctx.contains("Previous question"));
        assert!(!ctx.contains("keep applying"));
    }

    #[test]
    fn follow_up_shows_last_k_turns_in_order() {
        let ctx = ContextAssembler::new(2, 5).assemble("And in 2023?", &Filters::default(), &history(4), true);
        assert!(!ctx.contains("question 1\n"));
        assert!(!ctx.contains("question 2\n"));
        let third = ctx.find("Previous question: question 3").unwrap();
        let fourth = ctx.find("Previous question: question 4").unwrap();
        assert!(third < fourth);
        assert!(ctx.contains("keep applying them"));
        assert!(ctx.contains("Previous query:\nSELECT 4\n"));
    }

    #[test]
    fn turn_rows_are_capped() {
        let conversation = Conversation::new().append(turn(1, 9));
        let ctx = ContextAssembler::new(2, 3).assemble("More?", &Filters::default(), &conversation, true);
        assert!(ctx.contains("athlete_name: ATHLETE 2. place: 3."));
        assert!(!ctx.contains("ATHLETE 3"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let assembler = ContextAssembler::new(2, 5);
        let conversation = history(2);
        let a = assembler.assemble("q", &Filters::default(), &conversation, true);
        let b = assembler.assemble("q", &Filters::default(), &conversation, true);
        assert_eq!(a, b);
        assert_eq!(conversation.len(), 2);
    }
}
