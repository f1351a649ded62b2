//! Answer checking for exercise practice.

use serde::{Deserialize, Serialize};

/// Result of comparing a typed answer to an exercise's canonical answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub is_correct: bool,
    /// Typed answer with whitespace collapsed (for display).
    pub typed_normalized: String,
    /// Canonical answer with whitespace collapsed (for display).
    pub correct_normalized: String,
}

/// Compare answers ignoring case and surrounding or repeated whitespace.
pub fn check_answer(typed: &str, correct: &str) -> AnswerCheck {
    let typed_normalized = normalize_whitespace(typed);
    let correct_normalized = normalize_whitespace(correct);
    let is_correct = !typed_normalized.is_empty()
        && typed_normalized.to_lowercase() == correct_normalized.to_lowercase();

    AnswerCheck {
        is_correct,
        typed_normalized,
        correct_normalized,
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
