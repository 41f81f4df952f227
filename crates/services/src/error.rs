//! Shared error types for the session engine.

use thiserror::Error;

use quiz_core::model::{Lifeline, OptionKey, Phase, SessionSummaryError};

/// Errors emitted by the session state machine.
///
/// Every failing call leaves session state unchanged; all variants except
/// `Summary` are recoverable by the caller (re-prompt, ignore, or advance).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("action not valid while {phase}")]
    InvalidPhase { phase: Phase },

    #[error("option {selected} is not selectable for this question")]
    InvalidSelection { selected: OptionKey },

    #[error("the {lifeline} lifeline has already been used this session")]
    LifelineUnavailable { lifeline: Lifeline },

    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
