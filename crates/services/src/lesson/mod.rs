mod guard;
mod quiz;
mod state;
mod workflow;

// Public API of the lesson session subsystem.
pub use crate::error::{LessonError, QuizFlowError};
pub use quiz::{QuestionReview, QuizSession};
pub use state::{LessonState, OutlineRow, WATCHED_THRESHOLD};
pub use workflow::LessonFlowService;
