use std::fmt;

use tracing::warn;

use course_core::model::{
    Course, LearningState, QuizId, RegistrationId, Step, StepId, StepKind,
};

use super::guard::{RequestGuard, RequestToken};
use crate::error::LessonError;

/// Watch fraction at which a video counts as seen.
pub const WATCHED_THRESHOLD: f64 = 0.9;

//
// ─── OUTLINE ───────────────────────────────────────────────────────────────────
//

/// One step row for the lesson sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub step_id: StepId,
    pub title: String,
    pub kind: StepKind,
    pub unlocked: bool,
    pub completed: bool,
    pub active: bool,
}

//
// ─── LESSON STATE ──────────────────────────────────────────────────────────────
//

/// Client-side session state for one learner working through one course.
///
/// The server's `LearningState` stays authoritative: this struct only decides
/// which step is shown and tracks transient view flags. It is owned by the
/// caller and passed by reference into workflow methods; there is no global
/// store behind it.
pub struct LessonState {
    registration_id: RegistrationId,
    course: Course,
    learning: LearningState,
    active_step_id: StepId,
    active_kind: StepKind,
    video_watched: bool,
    guard: RequestGuard,
}

impl LessonState {
    /// Materializes session state from a loaded course and the server's
    /// learning state, positioned at the server's current step.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::CurrentStepMissing` if the server's current step
    /// is not part of the loaded course.
    pub fn new(
        registration_id: RegistrationId,
        course: Course,
        learning: LearningState,
    ) -> Result<Self, LessonError> {
        let current = learning.current_step_id();
        let step = course
            .find_step(current)
            .ok_or(LessonError::CurrentStepMissing {
                course: course.id(),
                step: current,
            })?;
        let active_kind = step.kind();

        Ok(Self {
            registration_id,
            course,
            learning,
            active_step_id: current,
            active_kind,
            video_watched: false,
            guard: RequestGuard::new(),
        })
    }

    #[must_use]
    pub fn registration_id(&self) -> RegistrationId {
        self.registration_id
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn learning(&self) -> &LearningState {
        &self.learning
    }

    #[must_use]
    pub fn active_step_id(&self) -> StepId {
        self.active_step_id
    }

    #[must_use]
    pub fn active_kind(&self) -> StepKind {
        self.active_kind
    }

    /// The active step. `None` cannot happen while the invariants hold (the
    /// active id always comes from the loaded course), but the lookup is kept
    /// fallible rather than panicking on a broken course payload.
    #[must_use]
    pub fn active_step(&self) -> Option<&Step> {
        self.course.find_step(self.active_step_id)
    }

    /// Quiz referenced by the active step, for quiz steps.
    #[must_use]
    pub fn active_quiz_id(&self) -> Option<QuizId> {
        self.active_step().and_then(Step::quiz_id)
    }

    #[must_use]
    pub fn video_watched(&self) -> bool {
        self.video_watched
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        self.learning.learning_progress()
    }

    /// A step is unlocked iff the server lists it as completed or current.
    #[must_use]
    pub fn is_unlocked(&self, step: StepId) -> bool {
        self.learning.is_unlocked(step)
    }

    /// Activates the step with the given id and resets the transient
    /// video-watched flag.
    ///
    /// An id the loaded course does not contain is ignored (stale id, or the
    /// course changed under us); the event is logged for investigation.
    /// Callers gate navigation on `is_unlocked`.
    pub fn set_active_step(&mut self, id: StepId) {
        let Some(step) = self.course.find_step(id) else {
            warn!(step_id = %id, "ignoring activation of a step the loaded course does not contain");
            return;
        };

        self.active_step_id = step.id();
        self.active_kind = step.kind();
        self.video_watched = false;
    }

    /// Records how far the current video has been watched. Once the ratio
    /// reaches `WATCHED_THRESHOLD` the watched flag is set and stays set
    /// until the active step changes.
    pub fn mark_video_progress(&mut self, ratio: f64) {
        if self.active_kind != StepKind::Video {
            return;
        }
        if ratio >= WATCHED_THRESHOLD {
            self.video_watched = true;
        }
    }

    /// The player reached the end of the video.
    pub fn mark_video_ended(&mut self) {
        self.mark_video_progress(1.0);
    }

    /// Replaces the server snapshot and follows its current step if it moved.
    pub fn apply_learning_state(&mut self, learning: LearningState) {
        let current = learning.current_step_id();
        self.learning = learning;
        if current != self.active_step_id {
            self.set_active_step(current);
        }
    }

    /// Rows for the lesson sidebar, in course order.
    #[must_use]
    pub fn outline(&self) -> Vec<OutlineRow> {
        self.course
            .steps()
            .map(|step| OutlineRow {
                step_id: step.id(),
                title: step.title().to_owned(),
                kind: step.kind(),
                unlocked: self.learning.is_unlocked(step.id()),
                completed: self.learning.is_completed(step.id()),
                active: step.id() == self.active_step_id,
            })
            .collect()
    }

    pub(crate) fn begin_refresh(&mut self) -> RequestToken {
        self.guard.begin()
    }

    pub(crate) fn admit_refresh(&self, token: RequestToken) -> bool {
        self.guard.admit(token)
    }
}

impl fmt::Debug for LessonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonState")
            .field("registration_id", &self.registration_id)
            .field("course_id", &self.course.id())
            .field("active_step_id", &self.active_step_id)
            .field("active_kind", &self.active_kind)
            .field("video_watched", &self.video_watched)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
