//! Question-bank parser.
//!
//! The source is plain text made of repeated blocks:
//!
//! ```text
//! Question 1: <prompt>
//! A) <option>
//! B) <option>
//! C) <option>
//! D) <option>
//! Answer: <A|B|C|D>
//! Score: <positive integer>
//! Timeout: <positive integer seconds>
//! ```
//!
//! The number after `Question` is informational only. Lines between blocks
//! that do not open a new block are skipped, but inside a block every line
//! must appear in the fixed order above; any deviation fails the whole parse.

use thiserror::Error;

use crate::model::{OptionKey, QuestionBank, QuestionDraft, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// What went wrong inside a question block.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlockErrorKind {
    #[error("no prompt text after the question marker")]
    MissingPromptText,

    #[error("block ends before its {expected} line")]
    Truncated { expected: &'static str },

    #[error("expected an option line starting with {expected})")]
    BadOptionTag { expected: OptionKey },

    #[error("expected an Answer: line")]
    BadAnswerTag,

    #[error("answer letter must be one of A-D, got {raw:?}")]
    BadAnswerLetter { raw: String },

    #[error("expected a Score: line")]
    BadScoreTag,

    #[error("score is not a positive integer: {raw:?}")]
    BadScore { raw: String },

    #[error("expected a Timeout: line")]
    BadTimeoutTag,

    #[error("timeout is not a positive integer: {raw:?}")]
    BadTimeout { raw: String },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Bank parsing failure. Fatal to the whole load attempt; no partial bank
/// is ever produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("malformed question block {block}: {kind}")]
    MalformedBlock { block: usize, kind: BlockErrorKind },
}

impl ParseError {
    /// 1-based ordinal of the block that failed.
    #[must_use]
    pub fn block(&self) -> usize {
        match self {
            ParseError::MalformedBlock { block, .. } => *block,
        }
    }
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//

const QUESTION_MARKER: &str = "Question";

/// Parse a bank source into an ordered `QuestionBank`.
///
/// A source with zero recognizable blocks yields an empty bank, which is
/// valid (the session completes immediately with score 0).
///
/// # Errors
///
/// Returns `ParseError::MalformedBlock` identifying the 1-based position of
/// the first bad block.
pub fn parse_bank(source: &str) -> Result<QuestionBank, ParseError> {
    let mut lines = source.lines();
    let mut questions = Vec::new();
    let mut block = 0_usize;

    while let Some(line) = lines.next() {
        let line = line.trim();
        if !line.starts_with(QUESTION_MARKER) {
            continue;
        }
        block += 1;
        let question =
            parse_block(line, &mut lines).map_err(|kind| ParseError::MalformedBlock { block, kind })?;
        questions.push(question);
    }

    Ok(QuestionBank::new(questions))
}

fn parse_block<'a>(
    marker_line: &str,
    lines: &mut impl Iterator<Item = &'a str>,
) -> Result<crate::model::Question, BlockErrorKind> {
    let prompt = prompt_text(marker_line)?;

    let mut options: [String; 4] = Default::default();
    for key in OptionKey::ALL {
        let line = next_line(lines, "option")?;
        options[key.index()] = option_text(line, key)?;
    }

    let answer_line = next_line(lines, "Answer")?;
    let correct = answer_key(answer_line)?;

    let score_line = next_line(lines, "Score")?;
    let point_value = score_value(score_line)?;

    let timeout_line = next_line(lines, "Timeout")?;
    let time_limit_secs = timeout_value(timeout_line)?;

    let draft = QuestionDraft {
        prompt,
        options,
        correct,
        point_value,
        time_limit_secs,
    };
    Ok(draft.validate()?)
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    expected: &'static str,
) -> Result<&'a str, BlockErrorKind> {
    lines
        .next()
        .map(str::trim)
        .ok_or(BlockErrorKind::Truncated { expected })
}

/// Text after the first `:` of a `Question <N>: ...` line.
fn prompt_text(line: &str) -> Result<String, BlockErrorKind> {
    let rest = line
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();
    if rest.is_empty() {
        return Err(BlockErrorKind::MissingPromptText);
    }
    Ok(rest.to_string())
}

fn option_text(line: &str, expected: OptionKey) -> Result<String, BlockErrorKind> {
    let tag_upper = format!("{})", expected.letter());
    let tag_lower = format!("{})", expected.letter().to_ascii_lowercase());
    let rest = line
        .strip_prefix(&tag_upper)
        .or_else(|| line.strip_prefix(&tag_lower))
        .ok_or(BlockErrorKind::BadOptionTag { expected })?;
    Ok(rest.trim().to_string())
}

fn answer_key(line: &str) -> Result<OptionKey, BlockErrorKind> {
    let rest = line
        .strip_prefix("Answer:")
        .ok_or(BlockErrorKind::BadAnswerTag)?;
    rest.parse().map_err(|_| BlockErrorKind::BadAnswerLetter {
        raw: rest.trim().to_string(),
    })
}

fn score_value(line: &str) -> Result<u32, BlockErrorKind> {
    let rest = line
        .strip_prefix("Score:")
        .ok_or(BlockErrorKind::BadScoreTag)?;
    rest.trim().parse().map_err(|_| BlockErrorKind::BadScore {
        raw: rest.trim().to_string(),
    })
}

fn timeout_value(line: &str) -> Result<u32, BlockErrorKind> {
    let rest = line
        .strip_prefix("Timeout:")
        .ok_or(BlockErrorKind::BadTimeoutTag)?;
    rest.trim().parse().map_err(|_| BlockErrorKind::BadTimeout {
        raw: rest.trim().to_string(),
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
Question 1: Largest planet?
A) Mars
B) Jupiter
C) Venus
D) Saturn
Answer: B
Score: 10
Timeout: 30

Question 2: Smallest prime?
A) 0
B) 1
C) 2
D) 3
Answer: C
Score: 5
Timeout: 15
";

    #[test]
    fn parses_every_block_in_order() {
        let bank = parse_bank(WELL_FORMED).unwrap();
        assert_eq!(bank.len(), 2);

        let first = bank.get(0).unwrap();
        assert_eq!(first.prompt(), "Largest planet?");
        assert_eq!(first.correct(), OptionKey::B);
        assert_eq!(first.point_value(), 10);
        assert_eq!(first.time_limit_secs(), 30);

        let second = bank.get(1).unwrap();
        assert_eq!(second.prompt(), "Smallest prime?");
        assert_eq!(second.option_text(OptionKey::C), "2");
    }

    #[test]
    fn empty_source_yields_empty_bank() {
        assert!(parse_bank("").unwrap().is_empty());
        assert!(parse_bank("\n\n  \n").unwrap().is_empty());
    }

    #[test]
    fn chatter_between_blocks_is_skipped() {
        let source = format!("# general knowledge pack\n\n{WELL_FORMED}\n-- end of file --\n");
        assert_eq!(parse_bank(&source).unwrap().len(), 2);
    }

    #[test]
    fn missing_option_line_fails_with_block_position() {
        let source = "\
Question 1: Largest planet?
A) Mars
B) Jupiter
D) Saturn
Answer: B
Score: 10
Timeout: 30
";
        let err = parse_bank(source).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedBlock {
                block: 1,
                kind: BlockErrorKind::BadOptionTag {
                    expected: OptionKey::C
                }
            }
        );
    }

    #[test]
    fn later_bad_block_is_reported_by_ordinal() {
        let source = format!(
            "{}\nQuestion 3: Truncated?\nA) yes\nB) no\n",
            WELL_FORMED.trim_end()
        );
        let err = parse_bank(&source).unwrap_err();
        assert_eq!(err.block(), 3);
        assert!(matches!(
            err,
            ParseError::MalformedBlock {
                kind: BlockErrorKind::Truncated { .. },
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_score_fails() {
        let source = WELL_FORMED.replace("Score: 10", "Score: ten");
        let err = parse_bank(&source).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedBlock {
                block: 1,
                kind: BlockErrorKind::BadScore {
                    raw: "ten".to_string()
                }
            }
        );
    }

    #[test]
    fn answer_letter_outside_a_to_d_fails() {
        let source = WELL_FORMED.replace("Answer: B", "Answer: E");
        let err = parse_bank(&source).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedBlock {
                block: 1,
                kind: BlockErrorKind::BadAnswerLetter { .. }
            }
        ));
    }

    #[test]
    fn truncated_final_block_fails() {
        let source = "\
Question 1: Largest planet?
A) Mars
B) Jupiter
C) Venus
D) Saturn
Answer: B
";
        let err = parse_bank(source).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedBlock {
                block: 1,
                kind: BlockErrorKind::Truncated { expected: "Score" }
            }
        );
    }

    #[test]
    fn zero_score_fails_through_question_validation() {
        let source = WELL_FORMED.replace("Score: 10", "Score: 0");
        let err = parse_bank(&source).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedBlock {
                block: 1,
                kind: BlockErrorKind::Question(crate::model::QuestionError::ZeroPointValue)
            }
        );
    }

    #[test]
    fn lower_case_option_tags_are_accepted() {
        let source = WELL_FORMED
            .replace("A) Mars", "a) Mars")
            .replace("Answer: B", "Answer: b");
        let bank = parse_bank(&source).unwrap();
        assert_eq!(bank.get(0).unwrap().correct(), OptionKey::B);
    }
}
