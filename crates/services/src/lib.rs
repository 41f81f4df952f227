#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use clock::{ClockEvent, CountdownClock};
pub use error::SessionError;
pub use sessions::{
    AnswerFeedback, Expiry, LifelineFeedback, LifelineState, QuizSession, RunnerEvent,
    SessionProgress, SessionRunner,
};
