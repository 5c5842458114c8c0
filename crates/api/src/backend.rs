//! Client contracts for the remote course backend, plus an in-memory fake
//! used by tests and the offline demo.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use course_core::Clock;
use course_core::model::{
    AccountId, Course, CourseId, LearningState, PayoutEntry, PlacementTest, PlacementTestId, Quiz,
    QuizAnswer, QuizId, QuizScore, Registration, RegistrationId, SectionId, Step, StepId,
    StepKind,
};

use crate::dto::DecodeError;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by backend clients.
///
/// Network failures are terminal for the request that hit them; callers show
/// a notification and move on, there is no retry layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Payload for creating a step, carrying the client's intent token.
///
/// The token doubles as an idempotency key: confirming the same intent twice
/// yields the same step on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStepRecord {
    pub intent: Uuid,
    pub course_id: CourseId,
    pub section_id: SectionId,
    pub title: String,
    pub kind: StepKind,
}

/// Payload for creating a quiz attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuizRecord {
    pub intent: Uuid,
    pub step_id: StepId,
    pub title: String,
}

/// One checked quiz attempt, persisted as answer history.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttemptRecord {
    pub registration_id: RegistrationId,
    pub quiz_id: QuizId,
    pub answers: Vec<QuizAnswer>,
    pub score: QuizScore,
    pub attempted_at: DateTime<Utc>,
}

/// A finished placement test run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSubmission {
    pub account_id: AccountId,
    pub test_id: PlacementTestId,
    pub answers: Vec<QuizAnswer>,
    pub score: QuizScore,
    pub attempted_at: DateTime<Utc>,
}

//
// ─── CLIENT CONTRACTS ──────────────────────────────────────────────────────────
//

/// Catalog and course structure.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// List catalog courses, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or decode failure.
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, ApiError>;

    /// Backend-side title search.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or decode failure.
    async fn search_courses(&self, query: &str, limit: u32) -> Result<Vec<Course>, ApiError>;

    /// Fetch a course by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the course does not exist.
    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError>;
}

/// Registrations and server-side learning progress.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// Look up the registration linking `account` to `course`, if any.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or decode failure; a missing
    /// registration is `Ok(None)`, not an error.
    async fn find_registration(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Option<Registration>, ApiError>;

    /// Create (or return the existing) registration for a purchase.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the course does not exist.
    async fn register(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Registration, ApiError>;

    /// Fetch the authoritative learning state for a registration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown registration.
    async fn learning_state(
        &self,
        registration: RegistrationId,
    ) -> Result<LearningState, ApiError>;

    /// Report a step as completed. Progression is recomputed server-side;
    /// callers re-fetch the learning state to observe the result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown registration or step.
    async fn submit_completed_step(
        &self,
        registration: RegistrationId,
        step: StepId,
    ) -> Result<(), ApiError>;
}

/// Quiz content and attempt history.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Fetch quiz detail by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown quiz.
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, ApiError>;

    /// Persist a checked attempt as answer history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn submit_attempt(&self, attempt: &QuizAttemptRecord) -> Result<(), ApiError>;
}

/// Placement tests.
#[async_trait]
pub trait PlacementApi: Send + Sync {
    /// Fetch a placement test by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown test.
    async fn get_placement_test(&self, id: PlacementTestId)
    -> Result<PlacementTest, ApiError>;

    /// Record a finished placement run.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn submit_placement(&self, submission: &PlacementSubmission) -> Result<(), ApiError>;
}

/// Lesson authoring (teacher tools).
#[async_trait]
pub trait AuthoringApi: Send + Sync {
    /// Create a step; deduplicated server-side on the intent token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn create_step(&self, record: &NewStepRecord) -> Result<StepId, ApiError>;

    /// Create a quiz for a step; deduplicated server-side on the intent token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn create_quiz(&self, record: &NewQuizRecord) -> Result<QuizId, ApiError>;
}

/// Teacher earnings.
#[async_trait]
pub trait PayoutApi: Send + Sync {
    /// Fetch raw payout entries for a teacher account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn payout_entries(&self, account: AccountId) -> Result<Vec<PayoutEntry>, ApiError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Inner {
    courses: Vec<Course>,
    registrations: HashMap<RegistrationId, Registration>,
    states: HashMap<RegistrationId, LearningState>,
    quizzes: HashMap<QuizId, Quiz>,
    placements: HashMap<PlacementTestId, PlacementTest>,
    attempts: Vec<QuizAttemptRecord>,
    placement_submissions: Vec<PlacementSubmission>,
    payouts: HashMap<AccountId, Vec<PayoutEntry>>,
    created_steps: HashMap<Uuid, StepId>,
    created_quizzes: HashMap<Uuid, QuizId>,
    next_id: u64,
}

/// In-memory stand-in for the remote backend, with the same progression
/// semantics the server applies: submitting the current step advances
/// `current_step_id` to the next step in course order.
///
/// Used by tests and the offline demo.
#[derive(Clone)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<Inner>>,
    clock: Clock,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            })),
            clock: Clock::Default,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ApiError> {
        self.inner
            .lock()
            .map_err(|e| ApiError::Unavailable(e.to_string()))
    }

    /// Seed a catalog course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn insert_course(&self, course: Course) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.courses.retain(|c| c.id() != course.id());
        inner.courses.push(course);
        Ok(())
    }

    /// Seed a quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn insert_quiz(&self, quiz: Quiz) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.quizzes.insert(quiz.id(), quiz);
        Ok(())
    }

    /// Seed a placement test.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn insert_placement_test(&self, test: PlacementTest) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.placements.insert(test.id(), test);
        Ok(())
    }

    /// Seed payout entries for a teacher account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn insert_payouts(
        &self,
        account: AccountId,
        entries: Vec<PayoutEntry>,
    ) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.payouts.entry(account).or_default().extend(entries);
        Ok(())
    }

    /// Seed a registration together with its learning state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn seed_registration(
        &self,
        registration: Registration,
        state: LearningState,
    ) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.states.insert(registration.id(), state);
        inner.registrations.insert(registration.id(), registration);
        Ok(())
    }

    /// Attempts recorded via `submit_attempt`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn recorded_attempts(&self) -> Result<Vec<QuizAttemptRecord>, ApiError> {
        Ok(self.lock()?.attempts.clone())
    }

    /// Placement submissions recorded via `submit_placement`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the store is poisoned.
    pub fn recorded_placements(&self) -> Result<Vec<PlacementSubmission>, ApiError> {
        Ok(self.lock()?.placement_submissions.clone())
    }
}

#[async_trait]
impl CourseApi for InMemoryBackend {
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, ApiError> {
        let inner = self.lock()?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(inner.courses.iter().take(limit).cloned().collect())
    }

    async fn search_courses(&self, query: &str, limit: u32) -> Result<Vec<Course>, ApiError> {
        let inner = self.lock()?;
        let needle = query.to_lowercase();
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(inner
            .courses
            .iter()
            .filter(|c| c.title().to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError> {
        let inner = self.lock()?;
        inner
            .courses
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl RegistrationApi for InMemoryBackend {
    async fn find_registration(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Option<Registration>, ApiError> {
        let inner = self.lock()?;
        Ok(inner
            .registrations
            .values()
            .find(|r| r.account_id() == account && r.course_id() == course)
            .cloned())
    }

    async fn register(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Registration, ApiError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner
            .registrations
            .values()
            .find(|r| r.account_id() == account && r.course_id() == course)
        {
            return Ok(existing.clone());
        }

        let first_step = inner
            .courses
            .iter()
            .find(|c| c.id() == course)
            .ok_or(ApiError::NotFound)?
            .steps()
            .next()
            .map(Step::id)
            .ok_or_else(|| ApiError::Unavailable("course has no steps".into()))?;

        let id = RegistrationId::new(inner.next_id);
        inner.next_id += 1;

        let registration = Registration::from_server(
            id,
            account,
            course,
            0.0,
            false,
            self.clock.now(),
        )
        .map_err(DecodeError::from)?;
        let state = LearningState::from_server(first_step, std::collections::HashSet::new(), 0.0)
            .map_err(DecodeError::from)?;

        inner.registrations.insert(id, registration.clone());
        inner.states.insert(id, state);
        Ok(registration)
    }

    async fn learning_state(
        &self,
        registration: RegistrationId,
    ) -> Result<LearningState, ApiError> {
        let inner = self.lock()?;
        inner
            .states
            .get(&registration)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn submit_completed_step(
        &self,
        registration: RegistrationId,
        step: StepId,
    ) -> Result<(), ApiError> {
        let mut inner = self.lock()?;

        let reg = inner
            .registrations
            .get(&registration)
            .cloned()
            .ok_or(ApiError::NotFound)?;
        let course = inner
            .courses
            .iter()
            .find(|c| c.id() == reg.course_id())
            .cloned()
            .ok_or(ApiError::NotFound)?;
        course.find_step(step).ok_or(ApiError::NotFound)?;
        let state = inner.states.get(&registration).ok_or(ApiError::NotFound)?;

        let mut completed = state.completed_step_ids().clone();
        completed.insert(step);

        let current = if state.current_step_id() == step {
            course
                .next_step_after(step)
                .map_or(step, Step::id)
        } else {
            state.current_step_id()
        };

        let total = course.total_steps();
        #[allow(clippy::cast_precision_loss)]
        let progress = if total == 0 {
            1.0
        } else {
            (completed.len() as f32 / total as f32).min(1.0)
        };
        let finished = completed.len() >= total;

        let new_state =
            LearningState::from_server(current, completed, progress).map_err(DecodeError::from)?;
        let new_reg = Registration::from_server(
            reg.id(),
            reg.account_id(),
            reg.course_id(),
            progress,
            finished,
            reg.created_at(),
        )
        .map_err(DecodeError::from)?;

        inner.states.insert(registration, new_state);
        inner.registrations.insert(registration, new_reg);
        Ok(())
    }
}

#[async_trait]
impl QuizApi for InMemoryBackend {
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let inner = self.lock()?;
        inner.quizzes.get(&id).cloned().ok_or(ApiError::NotFound)
    }

    async fn submit_attempt(&self, attempt: &QuizAttemptRecord) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.attempts.push(attempt.clone());
        Ok(())
    }
}

#[async_trait]
impl PlacementApi for InMemoryBackend {
    async fn get_placement_test(
        &self,
        id: PlacementTestId,
    ) -> Result<PlacementTest, ApiError> {
        let inner = self.lock()?;
        inner.placements.get(&id).cloned().ok_or(ApiError::NotFound)
    }

    async fn submit_placement(&self, submission: &PlacementSubmission) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        inner.placement_submissions.push(submission.clone());
        Ok(())
    }
}

#[async_trait]
impl AuthoringApi for InMemoryBackend {
    async fn create_step(&self, record: &NewStepRecord) -> Result<StepId, ApiError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner.created_steps.get(&record.intent) {
            return Ok(*existing);
        }
        let id = StepId::new(inner.next_id);
        inner.next_id += 1;
        inner.created_steps.insert(record.intent, id);
        Ok(id)
    }

    async fn create_quiz(&self, record: &NewQuizRecord) -> Result<QuizId, ApiError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner.created_quizzes.get(&record.intent) {
            return Ok(*existing);
        }
        let id = QuizId::new(inner.next_id);
        inner.next_id += 1;
        inner.created_quizzes.insert(record.intent, id);
        Ok(id)
    }
}

#[async_trait]
impl PayoutApi for InMemoryBackend {
    async fn payout_entries(&self, account: AccountId) -> Result<Vec<PayoutEntry>, ApiError> {
        let inner = self.lock()?;
        Ok(inner.payouts.get(&account).cloned().unwrap_or_default())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{Section, SectionId, Step, StepContent};
    use course_core::time::fixed_clock;
    use url::Url;

    fn video_step(id: u64, position: u32) -> Step {
        Step::new(
            StepId::new(id),
            format!("Step {id}"),
            position,
            StepContent::Video {
                url: Url::parse("https://cdn.example.com/v.mp4").unwrap(),
                duration_secs: 60,
            },
        )
        .unwrap()
    }

    fn three_step_course() -> Course {
        let section = Section::new(
            SectionId::new(1),
            "Basics",
            1,
            vec![video_step(1, 1), video_step(2, 2), video_step(3, 3)],
        )
        .unwrap();
        Course::new(
            CourseId::new(1),
            "Rust from Zero",
            None,
            9_900,
            3_600,
            None,
            vec![section],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn register_points_at_first_step() {
        let backend = InMemoryBackend::new().with_clock(fixed_clock());
        backend.insert_course(three_step_course()).unwrap();

        let reg = backend
            .register(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();
        let state = backend.learning_state(reg.id()).await.unwrap();

        assert_eq!(state.current_step_id(), StepId::new(1));
        assert!(state.completed_step_ids().is_empty());
    }

    #[tokio::test]
    async fn register_is_idempotent_per_account_and_course() {
        let backend = InMemoryBackend::new().with_clock(fixed_clock());
        backend.insert_course(three_step_course()).unwrap();

        let first = backend
            .register(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();
        let second = backend
            .register(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();
        assert_eq!(first.id(), second.id());
    }

    #[tokio::test]
    async fn completing_current_step_advances() {
        let backend = InMemoryBackend::new().with_clock(fixed_clock());
        backend.insert_course(three_step_course()).unwrap();
        let reg = backend
            .register(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();

        backend
            .submit_completed_step(reg.id(), StepId::new(1))
            .await
            .unwrap();
        let state = backend.learning_state(reg.id()).await.unwrap();

        assert_eq!(state.current_step_id(), StepId::new(2));
        assert!(state.is_completed(StepId::new(1)));
        assert!(state.learning_progress() > 0.0);
    }

    #[tokio::test]
    async fn completing_all_steps_finishes_registration() {
        let backend = InMemoryBackend::new().with_clock(fixed_clock());
        backend.insert_course(three_step_course()).unwrap();
        let reg = backend
            .register(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap();

        for id in 1..=3 {
            backend
                .submit_completed_step(reg.id(), StepId::new(id))
                .await
                .unwrap();
        }

        let refreshed = backend
            .find_registration(AccountId::new(7), CourseId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert!(refreshed.completed());
        assert!((refreshed.learning_progress() - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn create_step_dedupes_on_intent() {
        let backend = InMemoryBackend::new();
        let record = NewStepRecord {
            intent: Uuid::new_v4(),
            course_id: CourseId::new(1),
            section_id: SectionId::new(1),
            title: "New lesson".into(),
            kind: StepKind::Video,
        };

        let first = backend.create_step(&record).await.unwrap();
        let second = backend.create_step(&record).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let backend = InMemoryBackend::new();
        let err = backend.get_course(CourseId::new(404)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
