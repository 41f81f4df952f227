use tokio::sync::mpsc;
use tracing::{debug, info};

use quiz_core::model::{Lifeline, OptionKey, Phase, QuestionBank};
use quiz_core::time::Clock;

use crate::clock::{ClockEvent, CountdownClock};
use crate::error::SessionError;
use super::session::{AnswerFeedback, Expiry, LifelineFeedback, QuizSession};

/// Clock event after the generation filter, as seen by a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    /// One second elapsed on the open question's countdown.
    Tick { remaining_secs: u32 },
    /// The open question's countdown expired and the question closed with
    /// no points.
    TimeUp,
}

/// Drives a `QuizSession` against a live countdown clock.
///
/// All mutation funnels through `&mut self`, which is the serialization the
/// state machine requires: a user submission and a timer expiry can race at
/// a question boundary, and whichever reaches the session first wins while
/// the loser is filtered by the generation token.
#[derive(Debug)]
pub struct SessionRunner {
    session: QuizSession,
    clock: CountdownClock,
    events: mpsc::UnboundedReceiver<ClockEvent>,
}

impl SessionRunner {
    /// Start a session and arm the countdown for its first question.
    #[must_use]
    pub fn start(bank: QuestionBank, clock: Clock) -> Self {
        let session = QuizSession::new(bank, clock);
        let (countdown, events) = CountdownClock::new();
        let mut runner = Self {
            session,
            clock: countdown,
            events,
        };
        info!(questions = runner.session.progress().total, "session started");
        runner.arm_current();
        runner
    }

    /// Read-only access to the underlying state machine.
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Submit an answer for the open question and stop its countdown.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the state machine; the countdown keeps
    /// running on failure since the question is still open.
    pub fn submit_answer(&mut self, selected: OptionKey) -> Result<AnswerFeedback, SessionError> {
        let feedback = self.session.submit_answer(selected)?;
        self.clock.disarm();
        debug!(%selected, correct = feedback.correct, delta = feedback.score_delta, "answer submitted");
        Ok(feedback)
    }

    /// Use a lifeline; a skip also stops the countdown.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the state machine.
    pub fn use_lifeline(&mut self, lifeline: Lifeline) -> Result<LifelineFeedback, SessionError> {
        let feedback = self.session.use_lifeline(lifeline)?;
        if feedback.phase == Phase::QuestionClosed {
            self.clock.disarm();
        }
        debug!(%lifeline, eliminated = ?feedback.eliminated, "lifeline used");
        Ok(feedback)
    }

    /// Advance past a closed question, arming a fresh countdown if another
    /// question opens.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError::InvalidPhase` while a question is open.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        let phase = self.session.advance()?;
        match phase {
            Phase::AwaitingAnswer => self.arm_current(),
            Phase::SessionComplete => {
                info!(score = self.session.score(), "session complete");
            }
            Phase::QuestionClosed => {}
        }
        Ok(phase)
    }

    /// Next countdown event for the open question.
    ///
    /// Stale ticks and expiries (from a question that already closed) are
    /// filtered here and never surface. Returns `None` if the clock channel
    /// closes, which cannot happen while the runner holds the clock.
    ///
    /// Cancel-safe: dropping the future loses no events.
    pub async fn next_event(&mut self) -> Option<RunnerEvent> {
        while let Some(event) = self.events.recv().await {
            let generation = event.generation();
            match event {
                ClockEvent::Tick { remaining_secs, .. } => {
                    if generation == self.session.generation()
                        && self.session.phase() == Phase::AwaitingAnswer
                    {
                        return Some(RunnerEvent::Tick { remaining_secs });
                    }
                    debug!(generation, "dropped stale tick");
                }
                ClockEvent::Expired { .. } => match self.session.handle_timer_expired(generation) {
                    Expiry::Closed => {
                        self.clock.disarm();
                        debug!(generation, "question timed out");
                        return Some(RunnerEvent::TimeUp);
                    }
                    Expiry::Stale => {
                        debug!(generation, "dropped stale expiry");
                    }
                },
            }
        }
        None
    }

    fn arm_current(&mut self) {
        if let Some(question) = self.session.current_question() {
            self.clock
                .arm(question.time_limit_secs(), self.session.generation());
        }
    }
}
