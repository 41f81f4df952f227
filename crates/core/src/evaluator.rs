//! Answer evaluation.
//!
//! Pure comparison of a submitted key against the question's correct key.
//! Eligibility checks (phase, eliminated options) belong to the session; by
//! the time a key reaches `evaluate` it is assumed to be selectable.

use crate::model::{OptionKey, Question};

/// Outcome of evaluating one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    pub score_delta: u32,
}

/// Score a submitted option against a question.
///
/// Returns the question's full point value on a match, zero otherwise.
#[must_use]
pub fn evaluate(question: &Question, selected: OptionKey) -> Evaluation {
    let correct = selected == question.correct();
    Evaluation {
        correct,
        score_delta: if correct { question.point_value() } else { 0 },
    }
}
