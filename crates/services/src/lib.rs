#![forbid(unsafe_code)]

pub mod app_services;
pub mod authoring_service;
pub mod catalog_service;
pub mod error;
pub mod lesson;
pub mod payout_service;
pub mod placement_service;
pub mod registration_service;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use authoring_service::{AuthoringService, QuizDraft, QuizIntent, StepDraft, StepIntent};
pub use catalog_service::CatalogService;
pub use error::{
    AuthoringError, CatalogError, LessonError, PayoutServiceError, PlacementServiceError,
    QuizFlowError, RegistrationServiceError,
};
pub use lesson::{
    LessonFlowService, LessonState, OutlineRow, QuestionReview, QuizSession, WATCHED_THRESHOLD,
};
pub use payout_service::PayoutService;
pub use placement_service::{PlacementOutcome, PlacementService, PlacementSession};
pub use registration_service::RegistrationService;
