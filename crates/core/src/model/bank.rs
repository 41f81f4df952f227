use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Ordered collection of questions for one session.
///
/// Presentation order is load order; the bank never reorders or drops
/// entries, and an empty bank is a valid (immediately finished) session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Sum of all point values; the ceiling any session score can reach.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.questions
            .iter()
            .fold(0_u32, |acc, q| acc.saturating_add(q.point_value()))
    }
}

impl<'a> IntoIterator for &'a QuestionBank {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionKey, QuestionDraft};

    fn question(points: u32) -> Question {
        QuestionDraft {
            prompt: format!("worth {points}?"),
            options: [
                "one".to_string(),
                "two".to_string(),
                "three".to_string(),
                "four".to_string(),
            ],
            correct: OptionKey::A,
            point_value: points,
            time_limit_secs: 15,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn empty_bank_is_valid() {
        let bank = QuestionBank::default();
        assert!(bank.is_empty());
        assert_eq!(bank.max_score(), 0);
        assert!(bank.get(0).is_none());
    }

    #[test]
    fn max_score_sums_point_values() {
        let bank = QuestionBank::new(vec![question(10), question(20), question(5)]);
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.max_score(), 35);
    }

    #[test]
    fn bank_preserves_load_order() {
        let bank = QuestionBank::new(vec![question(1), question(2)]);
        assert_eq!(bank.get(0).unwrap().point_value(), 1);
        assert_eq!(bank.get(1).unwrap().point_value(), 2);
    }
}
