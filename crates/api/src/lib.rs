#![forbid(unsafe_code)]

pub mod backend;
pub mod dto;
pub mod http;

pub use backend::{
    ApiError, AuthoringApi, CourseApi, InMemoryBackend, NewQuizRecord, NewStepRecord, PayoutApi,
    PlacementApi, PlacementSubmission, QuizApi, QuizAttemptRecord, RegistrationApi,
};
pub use dto::DecodeError;
pub use http::{ApiConfig, HttpBackend};
