use std::collections::BTreeMap;

use course_core::model::{ChoiceId, QuestionId, Quiz, QuizAnswer, QuizScore};

use crate::error::QuizFlowError;

/// Revealed result for one question after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub chosen: ChoiceId,
    pub correct_choice: ChoiceId,
    pub is_correct: bool,
}

/// Local answer accumulation for one quiz attempt.
///
/// Answers are collected without feedback until `check`, which scores the
/// sheet and reveals correctness. A failed check can be retried, clearing all
/// answers; a passed check enables the continue action in the workflow.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    answers: BTreeMap<QuestionId, ChoiceId>,
    score: Option<QuizScore>,
}

impl QuizSession {
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            answers: BTreeMap::new(),
            score: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.quiz.questions().len()
    }

    /// True once every question has an answer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.quiz.questions().len()
    }

    #[must_use]
    pub fn selected(&self, question: QuestionId) -> Option<ChoiceId> {
        self.answers.get(&question).copied()
    }

    /// Records (or replaces) the answer for one question.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::AlreadyChecked` after a check, and
    /// `UnknownQuestion`/`UnknownChoice` for selections outside the quiz.
    pub fn select_answer(
        &mut self,
        question: QuestionId,
        choice: ChoiceId,
    ) -> Result<(), QuizFlowError> {
        if self.score.is_some() {
            return Err(QuizFlowError::AlreadyChecked);
        }
        let Some(q) = self.quiz.question(question) else {
            return Err(QuizFlowError::UnknownQuestion);
        };
        if !q.has_choice(choice) {
            return Err(QuizFlowError::UnknownChoice);
        }

        self.answers.insert(question, choice);
        Ok(())
    }

    /// Scores the sheet and reveals correctness.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Unanswered` if questions are missing answers
    /// and `QuizFlowError::AlreadyChecked` on a second check.
    pub fn check(&mut self) -> Result<QuizScore, QuizFlowError> {
        if self.score.is_some() {
            return Err(QuizFlowError::AlreadyChecked);
        }
        if !self.is_complete() {
            return Err(QuizFlowError::Unanswered {
                remaining: self.total_questions() - self.answered_count(),
            });
        }

        let sheet = self.answers_sheet();
        let score = QuizScore::from_answers(&self.quiz, &sheet)?;
        self.score = Some(score);
        Ok(score)
    }

    /// The score from the last check, if any.
    #[must_use]
    pub fn score(&self) -> Option<QuizScore> {
        self.score
    }

    /// Continue is enabled once a check cleared the pass threshold.
    #[must_use]
    pub fn can_continue(&self) -> bool {
        self.score.is_some_and(|s| s.passed())
    }

    /// Retry is offered only after a failed check.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.score.is_some_and(|s| !s.passed())
    }

    /// Clears answers and the revealed score for another attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::RetryUnavailable` unless the last check failed.
    pub fn retry(&mut self) -> Result<(), QuizFlowError> {
        if !self.can_retry() {
            return Err(QuizFlowError::RetryUnavailable);
        }
        self.answers.clear();
        self.score = None;
        Ok(())
    }

    /// Per-question correctness, revealed by a check.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NotChecked` before a check.
    pub fn review(&self) -> Result<Vec<QuestionReview>, QuizFlowError> {
        if self.score.is_none() {
            return Err(QuizFlowError::NotChecked);
        }

        Ok(self
            .quiz
            .questions()
            .iter()
            .filter_map(|q| {
                self.answers.get(&q.id).map(|chosen| QuestionReview {
                    question_id: q.id,
                    chosen: *chosen,
                    correct_choice: q.correct_choice,
                    is_correct: q.is_correct(*chosen),
                })
            })
            .collect())
    }

    /// Current answers in question order, for history submission.
    #[must_use]
    pub fn answers_sheet(&self) -> Vec<QuizAnswer> {
        self.quiz
            .questions()
            .iter()
            .filter_map(|q| {
                self.answers.get(&q.id).map(|choice| QuizAnswer {
                    question_id: q.id,
                    choice_id: *choice,
                })
            })
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{Choice, Question, QuizId};

    fn question(id: u64) -> Question {
        Question {
            id: QuestionId::new(id),
            prompt: format!("Q{id}"),
            choices: vec![
                Choice {
                    id: ChoiceId::new(id * 10),
                    text: "right".into(),
                },
                Choice {
                    id: ChoiceId::new(id * 10 + 1),
                    text: "wrong".into(),
                },
            ],
            correct_choice: ChoiceId::new(id * 10),
        }
    }

    fn session() -> QuizSession {
        let quiz = Quiz::new(
            QuizId::new(1),
            "Checkpoint",
            (1..=5).map(question).collect(),
        )
        .unwrap();
        QuizSession::new(quiz)
    }

    fn answer_all(session: &mut QuizSession, correct: usize) {
        for (i, q) in (1..=5).enumerate() {
            let choice = if i < correct { q * 10 } else { q * 10 + 1 };
            session
                .select_answer(QuestionId::new(q), ChoiceId::new(choice))
                .unwrap();
        }
    }

    #[test]
    fn four_of_five_enables_continue() {
        let mut session = session();
        answer_all(&mut session, 4);

        let score = session.check().unwrap();
        assert_eq!(score.correct(), 4);
        assert!(session.can_continue());
        assert!(!session.can_retry());
    }

    #[test]
    fn three_of_five_offers_retry_only() {
        let mut session = session();
        answer_all(&mut session, 3);

        session.check().unwrap();
        assert!(!session.can_continue());
        assert!(session.can_retry());
    }

    #[test]
    fn retry_clears_answers_and_score() {
        let mut session = session();
        answer_all(&mut session, 1);
        session.check().unwrap();

        session.retry().unwrap();
        assert_eq!(session.answered_count(), 0);
        assert!(session.score().is_none());
        assert!(!session.can_retry());
    }

    #[test]
    fn retry_after_pass_is_rejected() {
        let mut session = session();
        answer_all(&mut session, 5);
        session.check().unwrap();

        let err = session.retry().unwrap_err();
        assert!(matches!(err, QuizFlowError::RetryUnavailable));
    }

    #[test]
    fn check_requires_all_answers() {
        let mut session = session();
        session
            .select_answer(QuestionId::new(1), ChoiceId::new(10))
            .unwrap();

        let err = session.check().unwrap_err();
        assert!(matches!(err, QuizFlowError::Unanswered { remaining: 4 }));
    }

    #[test]
    fn answers_freeze_after_check() {
        let mut session = session();
        answer_all(&mut session, 5);
        session.check().unwrap();

        let err = session
            .select_answer(QuestionId::new(1), ChoiceId::new(11))
            .unwrap_err();
        assert!(matches!(err, QuizFlowError::AlreadyChecked));
    }

    #[test]
    fn unknown_question_and_choice_are_rejected() {
        let mut session = session();

        let err = session
            .select_answer(QuestionId::new(99), ChoiceId::new(10))
            .unwrap_err();
        assert!(matches!(err, QuizFlowError::UnknownQuestion));

        let err = session
            .select_answer(QuestionId::new(1), ChoiceId::new(999))
            .unwrap_err();
        assert!(matches!(err, QuizFlowError::UnknownChoice));
    }

    #[test]
    fn review_reveals_correctness_after_check() {
        let mut session = session();
        assert!(session.review().is_err());

        answer_all(&mut session, 3);
        session.check().unwrap();

        let review = session.review().unwrap();
        assert_eq!(review.len(), 5);
        assert_eq!(review.iter().filter(|r| r.is_correct).count(), 3);
    }

    #[test]
    fn changing_an_answer_before_check_replaces_it() {
        let mut session = session();
        session
            .select_answer(QuestionId::new(1), ChoiceId::new(11))
            .unwrap();
        session
            .select_answer(QuestionId::new(1), ChoiceId::new(10))
            .unwrap();

        assert_eq!(session.answered_count(), 1);
        assert_eq!(session.selected(QuestionId::new(1)), Some(ChoiceId::new(10)));
    }
}
