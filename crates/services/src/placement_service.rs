use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;

use api::{PlacementApi, PlacementSubmission};
use course_core::Clock;
use course_core::model::{
    AccountId, ChoiceId, PlacementTest, PlacementTestId, Question, QuestionId, QuizScore,
};

use crate::error::{PlacementServiceError, QuizFlowError};
use crate::lesson::QuizSession;

//
// ─── PLACEMENT SESSION ─────────────────────────────────────────────────────────
//

/// One learner's run through a placement test.
///
/// Presentation order is tracked separately from the quiz so shuffling never
/// touches the underlying answer sheet.
#[derive(Debug, Clone)]
pub struct PlacementSession {
    test: PlacementTest,
    order: Vec<QuestionId>,
    sheet: QuizSession,
    started_at: DateTime<Utc>,
}

impl PlacementSession {
    #[must_use]
    pub fn test(&self) -> &PlacementTest {
        &self.test
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> Vec<&Question> {
        self.order
            .iter()
            .filter_map(|id| self.test.quiz().question(*id))
            .collect()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.sheet.answered_count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sheet.is_complete()
    }

    /// Records the answer for one question.
    ///
    /// # Errors
    ///
    /// Propagates `QuizFlowError` for unknown questions/choices or a session
    /// that is already scored.
    pub fn select_answer(
        &mut self,
        question: QuestionId,
        choice: ChoiceId,
    ) -> Result<(), QuizFlowError> {
        self.sheet.select_answer(question, choice)
    }
}

/// Outcome of a finished placement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub score: QuizScore,
    pub level: String,
}

//
// ─── PLACEMENT SERVICE ─────────────────────────────────────────────────────────
//

/// Runs placement tests: fetch, present (optionally shuffled), score, submit,
/// and map the score onto the test's level bands.
#[derive(Clone)]
pub struct PlacementService {
    clock: Clock,
    placements: Arc<dyn PlacementApi>,
    shuffle: bool,
}

impl PlacementService {
    #[must_use]
    pub fn new(clock: Clock, placements: Arc<dyn PlacementApi>) -> Self {
        Self {
            clock,
            placements,
            shuffle: false,
        }
    }

    /// Enables random question order for presentation.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Fetches the test and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns `PlacementServiceError::Api` for an unknown test or a failed
    /// backend call.
    pub async fn start(
        &self,
        test_id: PlacementTestId,
    ) -> Result<PlacementSession, PlacementServiceError> {
        let test = self.placements.get_placement_test(test_id).await?;

        let mut order: Vec<QuestionId> =
            test.quiz().questions().iter().map(|q| q.id).collect();
        if self.shuffle {
            order.shuffle(&mut rng());
        }

        let sheet = QuizSession::new(test.quiz().clone());
        Ok(PlacementSession {
            test,
            order,
            sheet,
            started_at: self.clock.now(),
        })
    }

    /// Scores the session, submits the run, and recommends a level.
    ///
    /// # Errors
    ///
    /// Returns `PlacementServiceError::Quiz` if questions are unanswered and
    /// `PlacementServiceError::Api` if the submission fails.
    pub async fn finish(
        &self,
        account: AccountId,
        session: &mut PlacementSession,
    ) -> Result<PlacementOutcome, PlacementServiceError> {
        let score = match session.sheet.score() {
            Some(score) => score,
            None => session.sheet.check()?,
        };

        let submission = PlacementSubmission {
            account_id: account,
            test_id: session.test.id(),
            answers: session.sheet.answers_sheet(),
            score,
            attempted_at: self.clock.now(),
        };
        self.placements.submit_placement(&submission).await?;

        Ok(PlacementOutcome {
            score,
            level: session.test.recommend(score).to_owned(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use api::InMemoryBackend;
    use course_core::model::{Choice, LevelBand, Quiz, QuizId};
    use course_core::time::fixed_clock;

    fn placement_test() -> PlacementTest {
        let questions = (1..=5)
            .map(|i| Question {
                id: QuestionId::new(i),
                prompt: format!("Q{i}"),
                choices: vec![
                    Choice {
                        id: ChoiceId::new(i * 10),
                        text: "right".into(),
                    },
                    Choice {
                        id: ChoiceId::new(i * 10 + 1),
                        text: "wrong".into(),
                    },
                ],
                correct_choice: ChoiceId::new(i * 10),
            })
            .collect();
        let quiz = Quiz::new(QuizId::new(1), "Placement", questions).unwrap();
        PlacementTest::new(
            PlacementTestId::new(1),
            quiz,
            vec![
                LevelBand {
                    min_correct: 4,
                    level: "advanced".into(),
                },
                LevelBand {
                    min_correct: 2,
                    level: "intermediate".into(),
                },
                LevelBand {
                    min_correct: 0,
                    level: "beginner".into(),
                },
            ],
        )
        .unwrap()
    }

    fn service(backend: &InMemoryBackend) -> PlacementService {
        PlacementService::new(fixed_clock(), Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn unshuffled_session_preserves_question_order() {
        let backend = InMemoryBackend::new();
        backend.insert_placement_test(placement_test()).unwrap();

        let session = service(&backend)
            .start(PlacementTestId::new(1))
            .await
            .unwrap();
        let ids: Vec<u64> = session.questions().iter().map(|q| q.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn shuffled_session_keeps_every_question() {
        let backend = InMemoryBackend::new();
        backend.insert_placement_test(placement_test()).unwrap();

        let session = service(&backend)
            .with_shuffle(true)
            .start(PlacementTestId::new(1))
            .await
            .unwrap();

        let mut ids: Vec<u64> = session.questions().iter().map(|q| q.id.value()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn finish_scores_submits_and_recommends() {
        let backend = InMemoryBackend::new();
        backend.insert_placement_test(placement_test()).unwrap();
        let placement = service(&backend);

        let mut session = placement.start(PlacementTestId::new(1)).await.unwrap();
        for (i, q) in (1..=5).enumerate() {
            // Three correct answers: lands in the "intermediate" band.
            let choice = if i < 3 { q * 10 } else { q * 10 + 1 };
            session
                .select_answer(QuestionId::new(q), ChoiceId::new(choice))
                .unwrap();
        }

        let outcome = placement
            .finish(AccountId::new(7), &mut session)
            .await
            .unwrap();

        assert_eq!(outcome.level, "intermediate");
        assert_eq!(outcome.score.correct(), 3);

        let recorded = backend.recorded_placements().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].account_id, AccountId::new(7));
    }

    #[tokio::test]
    async fn finish_with_unanswered_questions_fails() {
        let backend = InMemoryBackend::new();
        backend.insert_placement_test(placement_test()).unwrap();
        let placement = service(&backend);

        let mut session = placement.start(PlacementTestId::new(1)).await.unwrap();
        let err = placement
            .finish(AccountId::new(7), &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, PlacementServiceError::Quiz(_)));
    }
}
