//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;
use course_core::model::{CourseId, PayoutError, QuizError, StepId};

/// Errors in the local quiz answer/check/retry cycle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("answers are already checked; retry before changing them")]
    AlreadyChecked,

    #[error("answers have not been checked yet")]
    NotChecked,

    #[error("{remaining} questions are still unanswered")]
    Unanswered { remaining: usize },

    #[error("question is not part of this quiz")]
    UnknownQuestion,

    #[error("choice does not belong to the question")]
    UnknownChoice,

    #[error("retry is only available after a failed check")]
    RetryUnavailable,

    #[error(transparent)]
    Score(#[from] QuizError),
}

/// Errors emitted by the lesson session controller and workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("course {course} does not contain the server's current step {step}")]
    CurrentStepMissing { course: CourseId, step: StepId },

    #[error("active step is not a video")]
    NotAVideoStep,

    #[error("active step is not a quiz")]
    NotAQuizStep,

    #[error("video has not been watched far enough")]
    VideoNotWatched,

    #[error("quiz score is below the pass threshold")]
    QuizNotPassed,

    #[error(transparent)]
    QuizFlow(#[from] QuizFlowError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `RegistrationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `PlacementService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlacementServiceError {
    #[error(transparent)]
    Quiz(#[from] QuizFlowError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `AuthoringService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthoringError {
    #[error("unknown or already confirmed intent")]
    UnknownIntent,

    #[error("pending intents unavailable: {0}")]
    Pending(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `PayoutService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PayoutServiceError {
    #[error(transparent)]
    Payout(#[from] PayoutError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
