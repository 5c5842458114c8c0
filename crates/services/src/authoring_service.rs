use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use api::{AuthoringApi, NewQuizRecord, NewStepRecord};
use course_core::model::{CourseId, QuizId, SectionId, StepId, StepKind};

use crate::error::AuthoringError;

//
// ─── DRAFTS AND INTENTS ────────────────────────────────────────────────────────
//

/// A step the teacher is about to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDraft {
    pub course_id: CourseId,
    pub section_id: SectionId,
    pub title: String,
    pub kind: StepKind,
}

/// A quiz the teacher is about to attach to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    pub step_id: StepId,
    pub title: String,
}

/// Reservation token for a drafted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepIntent {
    id: Uuid,
}

impl StepIntent {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Reservation token for a drafted quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizIntent {
    id: Uuid,
}

impl QuizIntent {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

//
// ─── AUTHORING SERVICE ─────────────────────────────────────────────────────────
//

/// Two-phase creation of steps and quizzes.
///
/// Drafting reserves a client-side intent; confirming performs the server
/// call, which deduplicates on the intent token. A draft that is never
/// confirmed never reaches the server, and confirming the same intent twice
/// fails locally, so an eager UI cannot create duplicates.
pub struct AuthoringService {
    authoring: Arc<dyn AuthoringApi>,
    pending_steps: Mutex<HashMap<Uuid, StepDraft>>,
    pending_quizzes: Mutex<HashMap<Uuid, QuizDraft>>,
}

impl AuthoringService {
    #[must_use]
    pub fn new(authoring: Arc<dyn AuthoringApi>) -> Self {
        Self {
            authoring,
            pending_steps: Mutex::new(HashMap::new()),
            pending_quizzes: Mutex::new(HashMap::new()),
        }
    }

    /// Reserves an intent for a new step without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Pending` if the reservation store is poisoned.
    pub fn draft_step(&self, draft: StepDraft) -> Result<StepIntent, AuthoringError> {
        let id = Uuid::new_v4();
        self.pending_steps
            .lock()
            .map_err(|e| AuthoringError::Pending(e.to_string()))?
            .insert(id, draft);
        Ok(StepIntent { id })
    }

    /// Confirms a drafted step, creating it server-side and retiring the
    /// intent.
    ///
    /// On a backend failure the intent stays reserved so the confirm can be
    /// retried; the server deduplicates on the token.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::UnknownIntent` for an unknown or already
    /// confirmed intent, and `AuthoringError::Api` for backend failures.
    pub async fn confirm_step(&self, intent: StepIntent) -> Result<StepId, AuthoringError> {
        let draft = self
            .pending_steps
            .lock()
            .map_err(|e| AuthoringError::Pending(e.to_string()))?
            .remove(&intent.id)
            .ok_or(AuthoringError::UnknownIntent)?;

        let record = NewStepRecord {
            intent: intent.id,
            course_id: draft.course_id,
            section_id: draft.section_id,
            title: draft.title.clone(),
            kind: draft.kind,
        };

        match self.authoring.create_step(&record).await {
            Ok(step_id) => Ok(step_id),
            Err(e) => {
                self.pending_steps
                    .lock()
                    .map_err(|e| AuthoringError::Pending(e.to_string()))?
                    .insert(intent.id, draft);
                Err(e.into())
            }
        }
    }

    /// Drops a drafted step without contacting the server. Returns whether
    /// the intent was still pending.
    pub fn discard_step(&self, intent: StepIntent) -> bool {
        self.pending_steps
            .lock()
            .map(|mut pending| pending.remove(&intent.id).is_some())
            .unwrap_or(false)
    }

    /// Reserves an intent for a new quiz without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Pending` if the reservation store is poisoned.
    pub fn draft_quiz(&self, draft: QuizDraft) -> Result<QuizIntent, AuthoringError> {
        let id = Uuid::new_v4();
        self.pending_quizzes
            .lock()
            .map_err(|e| AuthoringError::Pending(e.to_string()))?
            .insert(id, draft);
        Ok(QuizIntent { id })
    }

    /// Confirms a drafted quiz, creating it server-side and retiring the
    /// intent.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::UnknownIntent` for an unknown or already
    /// confirmed intent, and `AuthoringError::Api` for backend failures.
    pub async fn confirm_quiz(&self, intent: QuizIntent) -> Result<QuizId, AuthoringError> {
        let draft = self
            .pending_quizzes
            .lock()
            .map_err(|e| AuthoringError::Pending(e.to_string()))?
            .remove(&intent.id)
            .ok_or(AuthoringError::UnknownIntent)?;

        let record = NewQuizRecord {
            intent: intent.id,
            step_id: draft.step_id,
            title: draft.title.clone(),
        };

        match self.authoring.create_quiz(&record).await {
            Ok(quiz_id) => Ok(quiz_id),
            Err(e) => {
                self.pending_quizzes
                    .lock()
                    .map_err(|e| AuthoringError::Pending(e.to_string()))?
                    .insert(intent.id, draft);
                Err(e.into())
            }
        }
    }

    /// Drops a drafted quiz without contacting the server. Returns whether
    /// the intent was still pending.
    pub fn discard_quiz(&self, intent: QuizIntent) -> bool {
        self.pending_quizzes
            .lock()
            .map(|mut pending| pending.remove(&intent.id).is_some())
            .unwrap_or(false)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use api::{ApiError, InMemoryBackend};
    use async_trait::async_trait;

    fn step_draft(title: &str) -> StepDraft {
        StepDraft {
            course_id: CourseId::new(1),
            section_id: SectionId::new(1),
            title: title.into(),
            kind: StepKind::Video,
        }
    }

    #[tokio::test]
    async fn draft_then_confirm_creates_the_step() {
        let service = AuthoringService::new(Arc::new(InMemoryBackend::new()));
        let intent = service.draft_step(step_draft("New lesson")).unwrap();

        let step_id = service.confirm_step(intent).await.unwrap();
        assert!(step_id.value() > 0);
    }

    #[tokio::test]
    async fn confirming_twice_fails_the_second_time() {
        let service = AuthoringService::new(Arc::new(InMemoryBackend::new()));
        let intent = service.draft_step(step_draft("New lesson")).unwrap();

        service.confirm_step(intent).await.unwrap();
        let err = service.confirm_step(intent).await.unwrap_err();
        assert!(matches!(err, AuthoringError::UnknownIntent));
    }

    #[tokio::test]
    async fn distinct_drafts_get_distinct_intents_and_steps() {
        let service = AuthoringService::new(Arc::new(InMemoryBackend::new()));
        let first = service.draft_step(step_draft("Lesson A")).unwrap();
        let second = service.draft_step(step_draft("Lesson B")).unwrap();
        assert_ne!(first.id(), second.id());

        let a = service.confirm_step(first).await.unwrap();
        let b = service.confirm_step(second).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn discarded_draft_cannot_be_confirmed() {
        let service = AuthoringService::new(Arc::new(InMemoryBackend::new()));
        let intent = service.draft_step(step_draft("Abandoned")).unwrap();

        assert!(service.discard_step(intent));
        let err = service.confirm_step(intent).await.unwrap_err();
        assert!(matches!(err, AuthoringError::UnknownIntent));
    }

    /// Backend that fails every create once, then delegates.
    struct FlakyAuthoring {
        inner: InMemoryBackend,
        failed_once: Mutex<bool>,
    }

    #[async_trait]
    impl AuthoringApi for FlakyAuthoring {
        async fn create_step(&self, record: &NewStepRecord) -> Result<StepId, ApiError> {
            {
                let mut failed = self.failed_once.lock().map_err(|e| {
                    ApiError::Unavailable(e.to_string())
                })?;
                if !*failed {
                    *failed = true;
                    return Err(ApiError::Unavailable("transient".into()));
                }
            }
            self.inner.create_step(record).await
        }

        async fn create_quiz(&self, record: &NewQuizRecord) -> Result<QuizId, ApiError> {
            self.inner.create_quiz(record).await
        }
    }

    #[tokio::test]
    async fn failed_confirm_keeps_the_intent_for_retry() {
        let backend = Arc::new(FlakyAuthoring {
            inner: InMemoryBackend::new(),
            failed_once: Mutex::new(false),
        });
        let service = AuthoringService::new(backend);
        let intent = service.draft_step(step_draft("Retryable")).unwrap();

        let err = service.confirm_step(intent).await.unwrap_err();
        assert!(matches!(err, AuthoringError::Api(_)));

        // Same intent confirms cleanly on retry.
        let step_id = service.confirm_step(intent).await.unwrap();
        assert!(step_id.value() > 0);
    }

    #[tokio::test]
    async fn quiz_drafts_follow_the_same_protocol() {
        let service = AuthoringService::new(Arc::new(InMemoryBackend::new()));
        let intent = service
            .draft_quiz(QuizDraft {
                step_id: StepId::new(4),
                title: "Checkpoint".into(),
            })
            .unwrap();

        let quiz_id = service.confirm_quiz(intent).await.unwrap();
        assert!(quiz_id.value() > 0);

        let err = service.confirm_quiz(intent).await.unwrap_err();
        assert!(matches!(err, AuthoringError::UnknownIntent));
    }
}
