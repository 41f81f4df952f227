use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;
use std::fmt;

use quiz_core::evaluator::evaluate;
use quiz_core::model::{
    AnswerRecord, Lifeline, OptionKey, OutcomeKind, Phase, Question, QuestionBank, SessionSummary,
};
use quiz_core::time::Clock;

use crate::error::SessionError;
use super::progress::SessionProgress;

//
// ─── FEEDBACK TYPES ────────────────────────────────────────────────────────────
//

/// What a successful `submit_answer` tells the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub score_delta: u32,
    pub phase: Phase,
}

/// What a successful `use_lifeline` tells the caller.
///
/// `eliminated` is non-empty only for the fifty-fifty lifeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifelineFeedback {
    pub eliminated: Vec<OptionKey>,
    pub phase: Phase,
}

/// Result of delivering a timer-expiry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The signal was current; the question closed with no points.
    Closed,
    /// The signal arrived after the question already closed or advanced.
    /// Ignored, state unchanged.
    Stale,
}

/// Per-session availability of the two lifelines. Each is usable at most
/// once for the whole run, not per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifelineState {
    eliminate_two: bool,
    skip_question: bool,
}

impl LifelineState {
    fn fresh() -> Self {
        Self {
            eliminate_two: true,
            skip_question: true,
        }
    }

    #[must_use]
    pub fn available(&self, lifeline: Lifeline) -> bool {
        match lifeline {
            Lifeline::EliminateTwo => self.eliminate_two,
            Lifeline::SkipQuestion => self.skip_question,
        }
    }

    fn consume(&mut self, lifeline: Lifeline) {
        match lifeline {
            Lifeline::EliminateTwo => self.eliminate_two = false,
            Lifeline::SkipQuestion => self.skip_question = false,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Single-run quiz session state machine.
///
/// Owns the bank and all mutable session state; every mutation goes through
/// the methods below and either succeeds with the documented transition or
/// fails leaving state untouched. The struct is plain synchronous data, so
/// serializing callers (one event loop, or a mutex around the whole thing)
/// is the embedder's one concurrency obligation.
pub struct QuizSession {
    bank: QuestionBank,
    index: usize,
    score: u32,
    phase: Phase,
    lifelines: LifelineState,
    eliminated: Vec<OptionKey>,
    /// Bumped every time a question closes; a timer signal whose token does
    /// not match is stale and ignored.
    generation: u64,
    records: Vec<AnswerRecord>,
    clock: Clock,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over the given bank.
    ///
    /// An empty bank is valid and yields a session that is born complete
    /// with score 0.
    #[must_use]
    pub fn new(bank: QuestionBank, clock: Clock) -> Self {
        let started_at = clock.now();
        let (phase, completed_at) = if bank.is_empty() {
            (Phase::SessionComplete, Some(started_at))
        } else {
            (Phase::AwaitingAnswer, None)
        };

        Self {
            bank,
            index: 0,
            score: 0,
            phase,
            lifelines: LifelineState::fresh(),
            eliminated: Vec::new(),
            generation: 0,
            records: Vec::new(),
            clock,
            started_at,
            completed_at,
        }
    }

    //
    // ─── OBSERVERS ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current generation token; countdowns must be armed with this value.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The open (or just-closed) question. `None` iff the session is
    /// complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == Phase::SessionComplete {
            return None;
        }
        self.bank.get(self.index)
    }

    /// Options hidden for the current question by the fifty-fifty lifeline.
    #[must_use]
    pub fn eliminated_options(&self) -> &[OptionKey] {
        &self.eliminated
    }

    #[must_use]
    pub fn lifelines(&self) -> LifelineState {
        self.lifelines
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::SessionComplete
    }

    /// Counts view for front ends.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.bank.len(),
            answered: self.records.len(),
            remaining: self.bank.len().saturating_sub(self.records.len()),
            score: self.score,
            max_score: self.bank.max_score(),
            eliminate_two_available: self.lifelines.available(Lifeline::EliminateTwo),
            skip_available: self.lifelines.available(Lifeline::SkipQuestion),
            is_complete: self.is_complete(),
        }
    }

    /// Aggregate result; only meaningful once the session is complete.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` before completion, and
    /// propagates summary integrity failures.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let Some(completed_at) = self.completed_at else {
            return Err(SessionError::InvalidPhase { phase: self.phase });
        };
        Ok(SessionSummary::from_records(
            self.started_at,
            completed_at,
            self.bank.max_score(),
            &self.records,
        )?)
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────
    //

    /// Submit an answer for the open question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless a question is awaiting an
    /// answer, and `SessionError::InvalidSelection` if the key was hidden by
    /// the fifty-fifty lifeline. State is unchanged on failure.
    pub fn submit_answer(&mut self, selected: OptionKey) -> Result<AnswerFeedback, SessionError> {
        let question = self.open_question()?;
        if self.eliminated.contains(&selected) {
            return Err(SessionError::InvalidSelection { selected });
        }

        let evaluation = evaluate(question, selected);
        let kind = if evaluation.correct {
            OutcomeKind::Correct
        } else {
            OutcomeKind::Incorrect
        };
        self.close_question(kind, Some(selected), evaluation.score_delta);

        Ok(AnswerFeedback {
            correct: evaluation.correct,
            score_delta: evaluation.score_delta,
            phase: self.phase,
        })
    }

    /// Deliver a countdown expiry signal.
    ///
    /// Only a signal carrying the current generation token while a question
    /// is open has any effect; everything else is a stale no-op, which is
    /// how a race between a late timer and a concurrent submission resolves
    /// in favor of whichever arrived first.
    pub fn handle_timer_expired(&mut self, generation: u64) -> Expiry {
        if self.phase != Phase::AwaitingAnswer || generation != self.generation {
            return Expiry::Stale;
        }

        self.close_question(OutcomeKind::TimedOut, None, 0);
        Expiry::Closed
    }

    /// Use a lifeline on the open question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless a question is awaiting an
    /// answer, and `SessionError::LifelineUnavailable` if this lifeline was
    /// already spent this session. State is unchanged on failure.
    pub fn use_lifeline(&mut self, lifeline: Lifeline) -> Result<LifelineFeedback, SessionError> {
        let question = self.open_question()?;
        if !self.lifelines.available(lifeline) {
            return Err(SessionError::LifelineUnavailable { lifeline });
        }

        match lifeline {
            Lifeline::EliminateTwo => {
                let mut wrong = question.incorrect_keys();
                wrong.shuffle(&mut rng());
                wrong.truncate(2);
                wrong.sort_unstable();

                self.lifelines.consume(lifeline);
                self.eliminated = wrong.clone();
                Ok(LifelineFeedback {
                    eliminated: wrong,
                    phase: self.phase,
                })
            }
            Lifeline::SkipQuestion => {
                self.lifelines.consume(lifeline);
                self.close_question(OutcomeKind::Skipped, None, 0);
                Ok(LifelineFeedback {
                    eliminated: Vec::new(),
                    phase: self.phase,
                })
            }
        }
    }

    /// Move past a closed question.
    ///
    /// From `QuestionClosed` this opens the next question or, once the bank
    /// is exhausted, completes the session. From `SessionComplete` it is an
    /// idempotent no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` while a question is still open.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        match self.phase {
            Phase::AwaitingAnswer => Err(SessionError::InvalidPhase { phase: self.phase }),
            Phase::SessionComplete => Ok(Phase::SessionComplete),
            Phase::QuestionClosed => {
                self.eliminated.clear();
                self.index += 1;
                if self.index < self.bank.len() {
                    self.phase = Phase::AwaitingAnswer;
                } else {
                    self.phase = Phase::SessionComplete;
                    self.completed_at = Some(self.clock.now());
                }
                Ok(self.phase)
            }
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────
    //

    /// The question currently awaiting an answer.
    fn open_question(&self) -> Result<&Question, SessionError> {
        if self.phase != Phase::AwaitingAnswer {
            return Err(SessionError::InvalidPhase { phase: self.phase });
        }
        self.bank
            .get(self.index)
            .ok_or(SessionError::InvalidPhase { phase: self.phase })
    }

    fn close_question(&mut self, kind: OutcomeKind, selected: Option<OptionKey>, delta: u32) {
        self.score = self.score.saturating_add(delta);
        self.records.push(AnswerRecord::new(
            self.index,
            selected,
            kind,
            delta,
            self.clock.now(),
        ));
        self.phase = Phase::QuestionClosed;
        self.generation += 1;
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("bank_len", &self.bank.len())
            .field("index", &self.index)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("records_len", &self.records.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
