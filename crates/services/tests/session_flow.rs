use quiz_core::model::{Lifeline, OptionKey, OutcomeKind, Phase};
use quiz_core::parser::parse_bank;
use quiz_core::time::fixed_clock;
use services::{QuizSession, SessionError};

const BANK: &str = "\
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

Question 3: Boiling point of water at sea level?
A) 90 C
B) 95 C
C) 100 C
D) 110 C
Answer: C
Score: 20
Timeout: 20
";

#[test]
fn full_session_over_a_parsed_bank() {
    let bank = parse_bank(BANK).unwrap();
    let mut session = QuizSession::new(bank, fixed_clock());

    // Q1: fifty-fifty, then answer correctly.
    let feedback = session.use_lifeline(Lifeline::EliminateTwo).unwrap();
    assert_eq!(feedback.eliminated.len(), 2);
    assert!(!feedback.eliminated.contains(&OptionKey::B));
    let answer = session.submit_answer(OptionKey::B).unwrap();
    assert!(answer.correct);
    assert_eq!(session.score(), 10);
    assert_eq!(session.advance().unwrap(), Phase::AwaitingAnswer);

    // Q2: answer wrong.
    let answer = session.submit_answer(OptionKey::D).unwrap();
    assert!(!answer.correct);
    assert_eq!(session.score(), 10);
    assert_eq!(session.advance().unwrap(), Phase::AwaitingAnswer);

    // Q3: skip.
    session.use_lifeline(Lifeline::SkipQuestion).unwrap();
    assert_eq!(session.advance().unwrap(), Phase::SessionComplete);

    let summary = session.summary().unwrap();
    assert_eq!(summary.total_questions(), 3);
    assert_eq!(summary.total_score(), 10);
    assert_eq!(summary.max_score(), 35);
    assert_eq!(summary.correct(), 1);
    assert_eq!(summary.incorrect(), 1);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.timed_out(), 0);

    let kinds: Vec<OutcomeKind> = session.records().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OutcomeKind::Correct,
            OutcomeKind::Incorrect,
            OutcomeKind::Skipped
        ]
    );
}

#[test]
fn lifelines_are_spent_across_questions_not_per_question() {
    let bank = parse_bank(BANK).unwrap();
    let mut session = QuizSession::new(bank, fixed_clock());

    session.use_lifeline(Lifeline::EliminateTwo).unwrap();
    session.submit_answer(OptionKey::B).unwrap();
    session.advance().unwrap();

    let err = session.use_lifeline(Lifeline::EliminateTwo).unwrap_err();
    assert_eq!(
        err,
        SessionError::LifelineUnavailable {
            lifeline: Lifeline::EliminateTwo
        }
    );
}

#[test]
fn empty_source_yields_an_immediately_complete_session() {
    let bank = parse_bank("").unwrap();
    let session = QuizSession::new(bank, fixed_clock());

    assert_eq!(session.phase(), Phase::SessionComplete);
    assert_eq!(session.score(), 0);
    assert!(session.current_question().is_none());
}
