mod course;
mod ids;
mod payout;
mod placement;
mod quiz;
mod registration;

pub use ids::{
    AccountId, ChoiceId, CourseId, ParseIdError, PlacementTestId, QuestionId, QuizId,
    RegistrationId, SectionId, StepId,
};

pub use course::{Course, CourseError, Section, Step, StepContent, StepKind};
pub use payout::{MonthlyPayout, PayoutEntry, PayoutError, PayoutSummary};
pub use placement::{LevelBand, PlacementError, PlacementTest};
pub use quiz::{Choice, PASS_THRESHOLD, Question, Quiz, QuizAnswer, QuizError, QuizScore};
pub use registration::{LearningState, Registration, RegistrationError};
