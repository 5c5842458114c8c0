use std::sync::Arc;

use api::RegistrationApi;
use course_core::model::{AccountId, CourseId, LearningState, Registration, RegistrationId};

use crate::error::RegistrationServiceError;

/// Looks up and creates course registrations.
///
/// Registrations are created on purchase and never deleted; a missing
/// registration is a routine outcome that routes the learner to the course
/// page, not an error.
#[derive(Clone)]
pub struct RegistrationService {
    registrations: Arc<dyn RegistrationApi>,
}

impl RegistrationService {
    #[must_use]
    pub fn new(registrations: Arc<dyn RegistrationApi>) -> Self {
        Self { registrations }
    }

    /// The registration linking `account` to `course`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationServiceError::Api` if the backend call fails.
    pub async fn find(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Option<Registration>, RegistrationServiceError> {
        let registration = self.registrations.find_registration(account, course).await?;
        Ok(registration)
    }

    /// Creates the registration after a confirmed purchase. The backend is
    /// idempotent per account and course.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationServiceError::Api` if the course is unknown or
    /// the backend call fails.
    pub async fn register(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Registration, RegistrationServiceError> {
        let registration = self.registrations.register(account, course).await?;
        Ok(registration)
    }

    /// The authoritative learning state for a registration.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationServiceError::Api` for an unknown registration or
    /// a failed backend call.
    pub async fn learning_state(
        &self,
        registration: RegistrationId,
    ) -> Result<LearningState, RegistrationServiceError> {
        let state = self.registrations.learning_state(registration).await?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::InMemoryBackend;
    use course_core::model::{Course, Section, SectionId, Step, StepContent, StepId};

    fn seeded_backend() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        let step = Step::new(
            StepId::new(1),
            "Intro",
            1,
            StepContent::Video {
                url: "https://cdn.example.com/v.mp4".parse().unwrap(),
                duration_secs: 60,
            },
        )
        .unwrap();
        let section = Section::new(SectionId::new(1), "Basics", 1, vec![step]).unwrap();
        let course = Course::new(
            CourseId::new(1),
            "Rust from Zero",
            None,
            9_900,
            3_600,
            None,
            vec![section],
        )
        .unwrap();
        backend.insert_course(course).unwrap();
        backend
    }

    #[tokio::test]
    async fn find_returns_none_before_purchase() {
        let backend = seeded_backend();
        let service = RegistrationService::new(Arc::new(backend));

        let found = service
            .find(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn register_then_find_round_trips() {
        let backend = seeded_backend();
        let service = RegistrationService::new(Arc::new(backend));

        let created = service
            .register(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();
        let found = service
            .find(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.id(), found.id());
        assert!(!found.completed());

        let state = service.learning_state(found.id()).await.unwrap();
        assert_eq!(state.current_step_id(), StepId::new(1));
    }
}
