use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-scoped, single-use assist mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifeline {
    /// Hide two of the three incorrect options for the current question.
    EliminateTwo,
    /// Close the current question with no answer and no points.
    SkipQuestion,
}

impl fmt::Display for Lifeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifeline::EliminateTwo => write!(f, "fifty-fifty"),
            Lifeline::SkipQuestion => write!(f, "skip"),
        }
    }
}
