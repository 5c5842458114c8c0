use thiserror::Error;

use crate::model::ids::{ChoiceId, QuestionId, QuizId};

/// Minimum fraction of correct answers required to pass a quiz.
pub const PASS_THRESHOLD: f64 = 0.8;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("question {question} needs at least two choices")]
    TooFewChoices { question: QuestionId },

    #[error("question {question} marks a correct choice that is not among its choices")]
    UnknownCorrectChoice { question: QuestionId },

    #[error("duplicate question id {question}")]
    DuplicateQuestionId { question: QuestionId },

    #[error("score of {correct} correct out of {total} is impossible")]
    InvalidScore { correct: u32, total: u32 },

    #[error("score needs at least one question")]
    EmptyScore,
}

//
// ─── QUESTIONS AND CHOICES ─────────────────────────────────────────────────────
//

/// One selectable answer for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

/// Single-answer multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub correct_choice: ChoiceId,
}

impl Question {
    /// Returns true if `choice` is this question's correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: ChoiceId) -> bool {
        self.correct_choice == choice
    }

    /// Returns true if `choice` is one of this question's options.
    #[must_use]
    pub fn has_choice(&self, choice: ChoiceId) -> bool {
        self.choices.iter().any(|c| c.id == choice)
    }
}

/// A learner's selected choice for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAnswer {
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Ordered set of questions attached to a quiz step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    questions: Vec<Question>,
}

impl Quiz {
    /// Creates a quiz after validating its questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the title is blank, there are no questions, a
    /// question id repeats, a question has fewer than two choices, or a
    /// question's correct choice is not among its options.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let mut seen = std::collections::HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(QuizError::DuplicateQuestionId {
                    question: question.id,
                });
            }
            if question.choices.len() < 2 {
                return Err(QuizError::TooFewChoices {
                    question: question.id,
                });
            }
            if !question.has_choice(question.correct_choice) {
                return Err(QuizError::UnknownCorrectChoice {
                    question: question.id,
                });
            }
        }

        Ok(Self {
            id,
            title,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Result of checking a set of answers against a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    correct: u32,
    total: u32,
}

impl QuizScore {
    /// Builds a score from raw counts.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyScore` for zero questions and
    /// `QuizError::InvalidScore` if `correct > total`.
    pub fn new(correct: u32, total: u32) -> Result<Self, QuizError> {
        if total == 0 {
            return Err(QuizError::EmptyScore);
        }
        if correct > total {
            return Err(QuizError::InvalidScore { correct, total });
        }
        Ok(Self { correct, total })
    }

    /// Scores `answers` against `quiz`. Questions without an answer count as
    /// incorrect; answers to unknown questions are ignored.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyScore` if the quiz somehow has no questions.
    pub fn from_answers(quiz: &Quiz, answers: &[QuizAnswer]) -> Result<Self, QuizError> {
        let mut correct = 0_u32;
        for question in quiz.questions() {
            let answered_right = answers
                .iter()
                .find(|a| a.question_id == question.id)
                .is_some_and(|a| question.is_correct(a.choice_id));
            if answered_right {
                correct = correct.saturating_add(1);
            }
        }
        let total = u32::try_from(quiz.questions().len()).unwrap_or(u32::MAX);
        Self::new(correct, total)
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Fraction of correct answers, for display.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        f64::from(self.correct) / f64::from(self.total)
    }

    /// Whether the score clears `PASS_THRESHOLD`.
    ///
    /// Computed in integer arithmetic so the 80% boundary is exact.
    #[must_use]
    pub fn passed(&self) -> bool {
        u64::from(self.correct) * 10 >= u64::from(self.total) * 8
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, correct: u64) -> Question {
        Question {
            id: QuestionId::new(id),
            prompt: format!("Question {id}"),
            choices: vec![
                Choice {
                    id: ChoiceId::new(correct),
                    text: "right".into(),
                },
                Choice {
                    id: ChoiceId::new(correct + 1),
                    text: "wrong".into(),
                },
            ],
            correct_choice: ChoiceId::new(correct),
        }
    }

    fn five_question_quiz() -> Quiz {
        let questions = (1..=5).map(|i| question(i, i * 10)).collect();
        Quiz::new(QuizId::new(1), "Checkpoint", questions).unwrap()
    }

    #[test]
    fn quiz_requires_questions() {
        let err = Quiz::new(QuizId::new(1), "Empty", Vec::new()).unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions));
    }

    #[test]
    fn quiz_rejects_unknown_correct_choice() {
        let mut bad = question(1, 10);
        bad.correct_choice = ChoiceId::new(999);
        let err = Quiz::new(QuizId::new(1), "Bad", vec![bad]).unwrap_err();
        assert!(matches!(err, QuizError::UnknownCorrectChoice { .. }));
    }

    #[test]
    fn quiz_rejects_single_choice_question() {
        let mut bad = question(1, 10);
        bad.choices.truncate(1);
        let err = Quiz::new(QuizId::new(1), "Bad", vec![bad]).unwrap_err();
        assert!(matches!(err, QuizError::TooFewChoices { .. }));
    }

    #[test]
    fn four_of_five_passes() {
        let score = QuizScore::new(4, 5).unwrap();
        assert!(score.passed());
    }

    #[test]
    fn three_of_five_fails() {
        let score = QuizScore::new(3, 5).unwrap();
        assert!(!score.passed());
    }

    #[test]
    fn impossible_score_is_rejected() {
        let err = QuizScore::new(6, 5).unwrap_err();
        assert!(matches!(err, QuizError::InvalidScore { .. }));
    }

    #[test]
    fn scoring_counts_unanswered_as_wrong() {
        let quiz = five_question_quiz();
        let answers: Vec<QuizAnswer> = quiz
            .questions()
            .iter()
            .take(4)
            .map(|q| QuizAnswer {
                question_id: q.id,
                choice_id: q.correct_choice,
            })
            .collect();

        let score = QuizScore::from_answers(&quiz, &answers).unwrap();
        assert_eq!(score.correct(), 4);
        assert_eq!(score.total(), 5);
        assert!(score.passed());
    }

    #[test]
    fn scoring_ignores_answers_to_unknown_questions() {
        let quiz = five_question_quiz();
        let answers = vec![QuizAnswer {
            question_id: QuestionId::new(777),
            choice_id: ChoiceId::new(1),
        }];

        let score = QuizScore::from_answers(&quiz, &answers).unwrap();
        assert_eq!(score.correct(), 0);
        assert!(!score.passed());
    }
}
