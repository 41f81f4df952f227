use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::OptionKey;

//
// ─── OUTCOME KIND ──────────────────────────────────────────────────────────────
//

/// How a question was closed.
///
/// A skipped question is observable as distinct from an incorrect answer so
/// front ends and summaries can report it separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The submitted option matched the correct one.
    Correct,
    /// The submitted option did not match.
    Incorrect,
    /// The countdown expired before any submission.
    TimedOut,
    /// The skip lifeline closed the question.
    Skipped,
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Record of one closed question within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    /// The submitted key; `None` for timeouts and skips.
    pub selected: Option<OptionKey>,
    pub kind: OutcomeKind,
    pub score_delta: u32,
    pub closed_at: DateTime<Utc>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(
        question_index: usize,
        selected: Option<OptionKey>,
        kind: OutcomeKind,
        score_delta: u32,
        closed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            question_index,
            selected,
            kind,
            score_delta,
            closed_at,
        }
    }
}
