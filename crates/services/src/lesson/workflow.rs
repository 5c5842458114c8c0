use std::sync::Arc;

use tracing::debug;

use api::{CourseApi, QuizApi, QuizAttemptRecord, RegistrationApi};
use course_core::Clock;
use course_core::model::{CourseId, RegistrationId, StepKind};

use super::quiz::QuizSession;
use super::state::LessonState;
use crate::error::{LessonError, QuizFlowError};

/// Orchestrates a lesson session against the remote backend.
///
/// All progression goes through the server: this service submits completed
/// steps and mirrors the learning state it reads back, it never advances the
/// client on its own.
#[derive(Clone)]
pub struct LessonFlowService {
    clock: Clock,
    courses: Arc<dyn CourseApi>,
    registrations: Arc<dyn RegistrationApi>,
    quizzes: Arc<dyn QuizApi>,
}

impl LessonFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseApi>,
        registrations: Arc<dyn RegistrationApi>,
        quizzes: Arc<dyn QuizApi>,
    ) -> Self {
        Self {
            clock,
            courses,
            registrations,
            quizzes,
        }
    }

    /// Loads the course and learning state and materializes session state
    /// positioned at the server's current step.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Api` for backend failures and
    /// `LessonError::CurrentStepMissing` for inconsistent payloads.
    pub async fn start(
        &self,
        course_id: CourseId,
        registration_id: RegistrationId,
    ) -> Result<LessonState, LessonError> {
        let course = self.courses.get_course(course_id).await?;
        let learning = self.registrations.learning_state(registration_id).await?;
        LessonState::new(registration_id, course, learning)
    }

    /// Re-fetches the learning state and applies it, unless a newer refresh
    /// started in the meantime. Returns whether the response was applied.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Api` for backend failures.
    pub async fn refresh(&self, state: &mut LessonState) -> Result<bool, LessonError> {
        let token = state.begin_refresh();
        let learning = self
            .registrations
            .learning_state(state.registration_id())
            .await?;

        if !state.admit_refresh(token) {
            debug!(
                registration_id = %state.registration_id(),
                "discarding superseded learning-state response"
            );
            return Ok(false);
        }

        state.apply_learning_state(learning);
        Ok(true)
    }

    /// Reports the active video step as completed once it has been watched,
    /// then follows the server's new state.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NotAVideoStep` or `LessonError::VideoNotWatched`
    /// when the prerequisite is not met, and `LessonError::Api` for backend
    /// failures.
    pub async fn complete_current_video(
        &self,
        state: &mut LessonState,
    ) -> Result<(), LessonError> {
        if state.active_kind() != StepKind::Video {
            return Err(LessonError::NotAVideoStep);
        }
        if !state.video_watched() {
            return Err(LessonError::VideoNotWatched);
        }
        self.submit_and_refresh(state).await
    }

    /// Fetches the quiz for the active step and opens a fresh answer sheet.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NotAQuizStep` if the active step has no quiz,
    /// and `LessonError::Api` for backend failures.
    pub async fn open_quiz(&self, state: &LessonState) -> Result<QuizSession, LessonError> {
        let quiz_id = state.active_quiz_id().ok_or(LessonError::NotAQuizStep)?;
        let quiz = self.quizzes.get_quiz(quiz_id).await?;
        Ok(QuizSession::new(quiz))
    }

    /// Persists a checked attempt as answer history.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::QuizFlow` if the session has not been checked,
    /// and `LessonError::Api` for backend failures.
    pub async fn record_attempt(
        &self,
        state: &LessonState,
        session: &QuizSession,
    ) -> Result<(), LessonError> {
        let score = session.score().ok_or(QuizFlowError::NotChecked)?;
        let attempt = QuizAttemptRecord {
            registration_id: state.registration_id(),
            quiz_id: session.quiz().id(),
            answers: session.answers_sheet(),
            score,
            attempted_at: self.clock.now(),
        };
        self.quizzes.submit_attempt(&attempt).await?;
        Ok(())
    }

    /// The continue action after a passed quiz: reports the step completed
    /// and follows the server's new state.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::QuizNotPassed` below the pass threshold,
    /// `LessonError::QuizFlow` before a check, and `LessonError::Api` for
    /// backend failures.
    pub async fn continue_after_quiz(
        &self,
        state: &mut LessonState,
        session: &QuizSession,
    ) -> Result<(), LessonError> {
        if state.active_kind() != StepKind::Quiz {
            return Err(LessonError::NotAQuizStep);
        }
        let score = session.score().ok_or(QuizFlowError::NotChecked)?;
        if !score.passed() {
            return Err(LessonError::QuizNotPassed);
        }
        self.submit_and_refresh(state).await
    }

    async fn submit_and_refresh(&self, state: &mut LessonState) -> Result<(), LessonError> {
        self.registrations
            .submit_completed_step(state.registration_id(), state.active_step_id())
            .await?;
        self.refresh(state).await?;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
