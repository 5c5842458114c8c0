use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{AccountId, CourseId, RegistrationId, StepId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("learning progress must be a fraction in [0, 1], got {0}")]
    InvalidProgress(f32),
}

//
// ─── REGISTRATION ──────────────────────────────────────────────────────────────
//

/// Record linking a learner account to a purchased course.
///
/// Created on purchase, mutated as steps complete, never deleted; the API
/// surface intentionally has no delete operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    id: RegistrationId,
    account_id: AccountId,
    course_id: CourseId,
    learning_progress: f32,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Registration {
    /// Rehydrates a registration from a server payload.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::InvalidProgress` if the progress fraction
    /// is outside `[0, 1]` or not finite.
    pub fn from_server(
        id: RegistrationId,
        account_id: AccountId,
        course_id: CourseId,
        learning_progress: f32,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RegistrationError> {
        check_progress(learning_progress)?;
        Ok(Self {
            id,
            account_id,
            course_id,
            learning_progress,
            completed,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn learning_progress(&self) -> f32 {
        self.learning_progress
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── LEARNING STATE ────────────────────────────────────────────────────────────
//

/// Server-computed snapshot of a learner's progress through a course.
///
/// Read-only on the client: progression only ever changes by submitting a
/// completed step and reading the server's answer back.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningState {
    current_step_id: StepId,
    completed_step_ids: HashSet<StepId>,
    learning_progress: f32,
}

impl LearningState {
    /// Rehydrates a learning state from a server payload.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::InvalidProgress` if the progress fraction
    /// is outside `[0, 1]` or not finite.
    pub fn from_server(
        current_step_id: StepId,
        completed_step_ids: HashSet<StepId>,
        learning_progress: f32,
    ) -> Result<Self, RegistrationError> {
        check_progress(learning_progress)?;
        Ok(Self {
            current_step_id,
            completed_step_ids,
            learning_progress,
        })
    }

    #[must_use]
    pub fn current_step_id(&self) -> StepId {
        self.current_step_id
    }

    #[must_use]
    pub fn completed_step_ids(&self) -> &HashSet<StepId> {
        &self.completed_step_ids
    }

    #[must_use]
    pub fn learning_progress(&self) -> f32 {
        self.learning_progress
    }

    /// A step is unlocked for navigation iff it is already completed or is
    /// the current step.
    #[must_use]
    pub fn is_unlocked(&self, step: StepId) -> bool {
        step == self.current_step_id || self.completed_step_ids.contains(&step)
    }

    #[must_use]
    pub fn is_completed(&self, step: StepId) -> bool {
        self.completed_step_ids.contains(&step)
    }
}

fn check_progress(progress: f32) -> Result<(), RegistrationError> {
    if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
        return Err(RegistrationError::InvalidProgress(progress));
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
