use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on prompt length, in characters.
pub const MAX_PROMPT_LEN: usize = 300;

/// Upper bound on a single option text, in characters.
pub const MAX_OPTION_LEN: usize = 100;

//
// ─── OPTION KEY ────────────────────────────────────────────────────────────────
//

/// One of the four answer slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    /// All four keys in presentation order.
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    /// Zero-based slot index of this key.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            OptionKey::A => 0,
            OptionKey::B => 1,
            OptionKey::C => 2,
            OptionKey::D => 3,
        }
    }

    /// Letter used in the bank source and in front-end rendering.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            OptionKey::A => 'A',
            OptionKey::B => 'B',
            OptionKey::C => 'C',
            OptionKey::D => 'D',
        }
    }

    /// Parses a single answer letter, accepting either case.
    ///
    /// # Errors
    ///
    /// Returns `ParseOptionKeyError` for anything other than A-D.
    pub fn from_letter(letter: char) -> Result<Self, ParseOptionKeyError> {
        match letter.to_ascii_uppercase() {
            'A' => Ok(OptionKey::A),
            'B' => Ok(OptionKey::B),
            'C' => Ok(OptionKey::C),
            'D' => Ok(OptionKey::D),
            other => Err(ParseOptionKeyError(other.to_string())),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Error type for parsing an `OptionKey` from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("not an option letter (expected A-D): {0:?}")]
pub struct ParseOptionKeyError(String);

impl FromStr for OptionKey {
    type Err = ParseOptionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => OptionKey::from_letter(letter),
            _ => Err(ParseOptionKeyError(trimmed.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Validation errors for a single question entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("prompt text is empty")]
    EmptyPrompt,

    #[error("prompt text is too long: {len} chars (max {MAX_PROMPT_LEN})")]
    PromptTooLong { len: usize },

    #[error("option {key} text is empty")]
    EmptyOption { key: OptionKey },

    #[error("option {key} text is too long: {len} chars (max {MAX_OPTION_LEN})")]
    OptionTooLong { key: OptionKey, len: usize },

    #[error("options {first} and {second} have the same text")]
    DuplicateOption { first: OptionKey, second: OptionKey },

    #[error("point value must be positive")]
    ZeroPointValue,

    #[error("time limit must be positive")]
    ZeroTimeLimit,
}

/// Unvalidated question fields, as read from a bank source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: [String; 4],
    pub correct: OptionKey,
    pub point_value: u32,
    pub time_limit_secs: u32,
}

impl QuestionDraft {
    /// Validate the draft into a well-formed `Question`.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found: empty or over-long texts,
    /// duplicated option texts, or a zero score/time limit.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let prompt_len = prompt.chars().count();
        if prompt_len > MAX_PROMPT_LEN {
            return Err(QuestionError::PromptTooLong { len: prompt_len });
        }

        let mut options: [String; 4] = self.options;
        for (slot, key) in options.iter_mut().zip(OptionKey::ALL) {
            *slot = slot.trim().to_string();
            if slot.is_empty() {
                return Err(QuestionError::EmptyOption { key });
            }
            let len = slot.chars().count();
            if len > MAX_OPTION_LEN {
                return Err(QuestionError::OptionTooLong { key, len });
            }
        }

        for (i, first) in OptionKey::ALL.iter().enumerate() {
            for second in &OptionKey::ALL[i + 1..] {
                if options[first.index()] == options[second.index()] {
                    return Err(QuestionError::DuplicateOption {
                        first: *first,
                        second: *second,
                    });
                }
            }
        }

        if self.point_value == 0 {
            return Err(QuestionError::ZeroPointValue);
        }
        if self.time_limit_secs == 0 {
            return Err(QuestionError::ZeroTimeLimit);
        }

        Ok(Question {
            prompt,
            options,
            correct: self.correct,
            point_value: self.point_value,
            time_limit_secs: self.time_limit_secs,
        })
    }
}

/// A validated multiple-choice question.
///
/// Always carries a non-empty prompt, four distinct non-empty options and a
/// correct key that addresses one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    options: [String; 4],
    correct: OptionKey,
    point_value: u32,
    time_limit_secs: u32,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Option texts in A-D order.
    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn option_text(&self, key: OptionKey) -> &str {
        &self.options[key.index()]
    }

    #[must_use]
    pub fn correct(&self) -> OptionKey {
        self.correct
    }

    #[must_use]
    pub fn point_value(&self) -> u32 {
        self.point_value
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    /// The three keys that do not address the correct option.
    #[must_use]
    pub fn incorrect_keys(&self) -> Vec<OptionKey> {
        OptionKey::ALL
            .into_iter()
            .filter(|key| *key != self.correct)
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
