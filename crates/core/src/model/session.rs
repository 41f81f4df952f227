use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerRecord, OutcomeKind};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// State of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// A question is open and the countdown is running.
    AwaitingAnswer,
    /// The current question has been closed but not advanced past.
    QuestionClosed,
    /// The bank is exhausted; terminal.
    SessionComplete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingAnswer => write!(f, "awaiting answer"),
            Phase::QuestionClosed => write!(f, "question closed"),
            Phase::SessionComplete => write!(f, "session complete"),
        }
    }
}

//
// ─── SESSION SUMMARY ───────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many records for a single session: {len}")]
    TooManyRecords { len: usize },

    #[error("total score ({total}) exceeds the bank maximum ({max})")]
    ScoreExceedsMaximum { total: u32, max: u32 },
}

/// Aggregate result of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_questions: u32,
    total_score: u32,
    max_score: u32,
    correct: u32,
    incorrect: u32,
    timed_out: u32,
    skipped: u32,
}

impl SessionSummary {
    /// Build a summary from the per-question records of a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is
    /// before `started_at`, `TooManyRecords` if the record count cannot fit
    /// in `u32`, and `ScoreExceedsMaximum` if the accumulated score is above
    /// the bank ceiling.
    pub fn from_records(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        max_score: u32,
        records: &[AnswerRecord],
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }

        let total_questions = u32::try_from(records.len())
            .map_err(|_| SessionSummaryError::TooManyRecords { len: records.len() })?;

        let mut total_score = 0_u32;
        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        let mut timed_out = 0_u32;
        let mut skipped = 0_u32;

        for record in records {
            total_score = total_score.saturating_add(record.score_delta);
            match record.kind {
                OutcomeKind::Correct => correct = correct.saturating_add(1),
                OutcomeKind::Incorrect => incorrect = incorrect.saturating_add(1),
                OutcomeKind::TimedOut => timed_out = timed_out.saturating_add(1),
                OutcomeKind::Skipped => skipped = skipped.saturating_add(1),
            }
        }

        if total_score > max_score {
            return Err(SessionSummaryError::ScoreExceedsMaximum {
                total: total_score,
                max: max_score,
            });
        }

        Ok(Self {
            started_at,
            completed_at,
            total_questions,
            total_score,
            max_score,
            correct,
            incorrect,
            timed_out,
            skipped,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn timed_out(&self) -> u32 {
        self.timed_out
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionKey;
    use crate::time::fixed_now;

    #[test]
    fn summary_counts_outcomes() {
        let now = fixed_now();
        let records = vec![
            AnswerRecord::new(0, Some(OptionKey::B), OutcomeKind::Correct, 10, now),
            AnswerRecord::new(1, Some(OptionKey::A), OutcomeKind::Incorrect, 0, now),
            AnswerRecord::new(2, None, OutcomeKind::TimedOut, 0, now),
            AnswerRecord::new(3, None, OutcomeKind::Skipped, 0, now),
            AnswerRecord::new(4, Some(OptionKey::C), OutcomeKind::Correct, 5, now),
        ];

        let summary = SessionSummary::from_records(now, now, 40, &records).unwrap();

        assert_eq!(summary.total_questions(), 5);
        assert_eq!(summary.total_score(), 15);
        assert_eq!(summary.max_score(), 40);
        assert_eq!(summary.correct(), 2);
        assert_eq!(summary.incorrect(), 1);
        assert_eq!(summary.timed_out(), 1);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn summary_rejects_reversed_time_range() {
        let now = fixed_now();
        let earlier = now - chrono::Duration::seconds(60);
        let err = SessionSummary::from_records(now, earlier, 10, &[]).unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn summary_rejects_score_above_maximum() {
        let now = fixed_now();
        let records = vec![AnswerRecord::new(
            0,
            Some(OptionKey::A),
            OutcomeKind::Correct,
            50,
            now,
        )];
        let err = SessionSummary::from_records(now, now, 10, &records).unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::ScoreExceedsMaximum { total: 50, max: 10 }
        );
    }

    #[test]
    fn empty_session_summarizes_to_zero() {
        let now = fixed_now();
        let summary = SessionSummary::from_records(now, now, 0, &[]).unwrap();
        assert_eq!(summary.total_questions(), 0);
        assert_eq!(summary.total_score(), 0);
    }
}
