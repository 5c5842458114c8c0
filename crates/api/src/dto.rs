//! Wire types for the REST backend.
//!
//! All payloads are plain JSON. Conversion into domain types happens here so
//! the rest of the client never sees wire quirks such as the sentinel quiz id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use course_core::model::{
    Choice, ChoiceId, Course, CourseError, CourseId, LearningState, LevelBand, PayoutEntry,
    PlacementError, PlacementTest, PlacementTestId, Question, QuestionId, Quiz, QuizError, QuizId,
    Registration, RegistrationError, RegistrationId, Section, SectionId, Step, StepContent, StepId,
    StepKind,
};

//
// ─── DECODE ERRORS ─────────────────────────────────────────────────────────────
//

/// Errors converting backend payloads into domain types.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("step {step_id} carries neither a quiz id nor a video url")]
    MissingStepContent { step_id: u64 },

    #[error("step {step_id} video url is invalid: {url}")]
    InvalidVideoUrl { step_id: u64, url: String },

    #[error("step {step_id} is missing its video duration")]
    MissingVideoDuration { step_id: u64 },

    #[error("cover url is invalid: {url}")]
    InvalidCoverUrl { url: String },

    #[error(transparent)]
    Course(#[from] CourseError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

//
// ─── COURSE PAYLOADS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDto {
    pub id: u64,
    pub title: String,
    pub position: u32,
    /// Sentinel encoding: absent, zero, or negative means "no quiz".
    #[serde(default)]
    pub quiz_id: Option<i64>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_duration_secs: Option<u32>,
}

impl StepDto {
    /// Converts to a domain step, resolving the quiz-id sentinel.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` for a step with no usable content or an invalid
    /// video URL.
    pub fn into_domain(self) -> Result<Step, DecodeError> {
        // Non-positive ids are the backend's "no quiz" sentinel.
        let quiz_id = self
            .quiz_id
            .and_then(|raw| u64::try_from(raw).ok())
            .filter(|raw| *raw > 0);
        let content = match quiz_id {
            Some(raw) => StepContent::Quiz {
                quiz_id: QuizId::new(raw),
            },
            None => {
                let raw_url = self.video_url.ok_or(DecodeError::MissingStepContent {
                    step_id: self.id,
                })?;
                let url = Url::parse(&raw_url).map_err(|_| DecodeError::InvalidVideoUrl {
                    step_id: self.id,
                    url: raw_url,
                })?;
                let duration_secs =
                    self.video_duration_secs
                        .ok_or(DecodeError::MissingVideoDuration {
                            step_id: self.id,
                        })?;
                StepContent::Video { url, duration_secs }
            }
        };

        Ok(Step::new(
            StepId::new(self.id),
            self.title,
            self.position,
            content,
        )?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDto {
    pub id: u64,
    pub title: String,
    pub position: u32,
    pub steps: Vec<StepDto>,
}

impl SectionDto {
    /// # Errors
    ///
    /// Propagates step conversion and section validation failures.
    pub fn into_domain(self) -> Result<Section, DecodeError> {
        let steps = self
            .steps
            .into_iter()
            .map(StepDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Section::new(
            SectionId::new(self.id),
            self.title,
            self.position,
            steps,
        )?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: u32,
    pub duration_secs: u32,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub sections: Vec<SectionDto>,
}

impl CourseDto {
    /// # Errors
    ///
    /// Propagates section conversion and course validation failures.
    pub fn into_domain(self) -> Result<Course, DecodeError> {
        let cover_url = match self.cover_url {
            Some(raw) => Some(
                Url::parse(&raw).map_err(|_| DecodeError::InvalidCoverUrl { url: raw })?,
            ),
            None => None,
        };
        let sections = self
            .sections
            .into_iter()
            .map(SectionDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Course::new(
            CourseId::new(self.id),
            self.title,
            self.description,
            self.price_cents,
            self.duration_secs,
            cover_url,
            sections,
        )?)
    }
}

//
// ─── REGISTRATION PAYLOADS ─────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationDto {
    pub id: u64,
    pub account_id: u64,
    pub course_id: u64,
    pub learning_progress: f32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl RegistrationDto {
    /// # Errors
    ///
    /// Returns `DecodeError::Registration` for an out-of-range progress value.
    pub fn into_domain(self) -> Result<Registration, DecodeError> {
        Ok(Registration::from_server(
            RegistrationId::new(self.id),
            course_core::model::AccountId::new(self.account_id),
            CourseId::new(self.course_id),
            self.learning_progress,
            self.completed,
            self.created_at,
        )?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningStateDto {
    pub current_step_id: u64,
    pub completed_step_ids: Vec<u64>,
    pub learning_progress: f32,
}

impl LearningStateDto {
    /// # Errors
    ///
    /// Returns `DecodeError::Registration` for an out-of-range progress value.
    pub fn into_domain(self) -> Result<LearningState, DecodeError> {
        let completed = self
            .completed_step_ids
            .into_iter()
            .map(StepId::new)
            .collect();
        Ok(LearningState::from_server(
            StepId::new(self.current_step_id),
            completed,
            self.learning_progress,
        )?)
    }
}

//
// ─── QUIZ PAYLOADS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceDto {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: u64,
    pub prompt: String,
    pub choices: Vec<ChoiceDto>,
    pub correct_choice_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDto {
    pub id: u64,
    pub title: String,
    pub questions: Vec<QuestionDto>,
}

impl QuizDto {
    /// # Errors
    ///
    /// Returns `DecodeError::Quiz` if the quiz fails domain validation.
    pub fn into_domain(self) -> Result<Quiz, DecodeError> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question {
                id: QuestionId::new(q.id),
                prompt: q.prompt,
                choices: q
                    .choices
                    .into_iter()
                    .map(|c| Choice {
                        id: ChoiceId::new(c.id),
                        text: c.text,
                    })
                    .collect(),
                correct_choice: ChoiceId::new(q.correct_choice_id),
            })
            .collect();
        Ok(Quiz::new(QuizId::new(self.id), self.title, questions)?)
    }
}

//
// ─── PLACEMENT PAYLOADS ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelBandDto {
    pub min_correct: u32,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementTestDto {
    pub id: u64,
    pub quiz: QuizDto,
    pub bands: Vec<LevelBandDto>,
}

impl PlacementTestDto {
    /// # Errors
    ///
    /// Propagates quiz conversion and band validation failures.
    pub fn into_domain(self) -> Result<PlacementTest, DecodeError> {
        let quiz = self.quiz.into_domain()?;
        let bands = self
            .bands
            .into_iter()
            .map(|b| LevelBand {
                min_correct: b.min_correct,
                level: b.level,
            })
            .collect();
        Ok(PlacementTest::new(
            PlacementTestId::new(self.id),
            quiz,
            bands,
        )?)
    }
}

//
// ─── PAYOUT PAYLOADS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutEntryDto {
    pub course_id: u64,
    pub amount_cents: u64,
    pub occurred_at: DateTime<Utc>,
}

impl PayoutEntryDto {
    #[must_use]
    pub fn into_domain(self) -> PayoutEntry {
        PayoutEntry {
            course_id: CourseId::new(self.course_id),
            amount_cents: self.amount_cents,
            occurred_at: self.occurred_at,
        }
    }
}

//
// ─── REQUEST BODIES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub account_id: u64,
    pub course_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitStepRequest {
    pub step_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizAnswerDto {
    pub question_id: u64,
    pub choice_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizAttemptRequest {
    pub registration_id: u64,
    pub quiz_id: u64,
    pub answers: Vec<QuizAnswerDto>,
    pub correct_count: u32,
    pub total_count: u32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementSubmitRequest {
    pub account_id: u64,
    pub answers: Vec<QuizAnswerDto>,
    pub correct_count: u32,
    pub total_count: u32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKindDto {
    Video,
    Quiz,
}

impl From<StepKind> for StepKindDto {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Video => Self::Video,
            StepKind::Quiz => Self::Quiz,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateStepRequest {
    /// Client-generated idempotency token; the backend deduplicates on it.
    pub intent: Uuid,
    pub course_id: u64,
    pub section_id: u64,
    pub title: String,
    pub kind: StepKindDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateQuizRequest {
    pub intent: Uuid,
    pub step_id: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDto {
    pub id: u64,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn video_step_dto(id: u64, position: u32) -> StepDto {
        StepDto {
            id,
            title: format!("Step {id}"),
            position,
            quiz_id: None,
            video_url: Some("https://cdn.example.com/v.mp4".into()),
            video_duration_secs: Some(120),
        }
    }

    #[test]
    fn zero_quiz_id_is_a_video_step() {
        let mut dto = video_step_dto(1, 1);
        dto.quiz_id = Some(0);
        let step = dto.into_domain().unwrap();
        assert_eq!(step.kind(), StepKind::Video);
    }

    #[test]
    fn negative_quiz_id_is_a_video_step() {
        let mut dto = video_step_dto(1, 1);
        dto.quiz_id = Some(-1);
        let step = dto.into_domain().unwrap();
        assert_eq!(step.kind(), StepKind::Video);
    }

    #[test]
    fn positive_quiz_id_is_a_quiz_step() {
        let dto = StepDto {
            id: 1,
            title: "Checkpoint".into(),
            position: 1,
            quiz_id: Some(42),
            video_url: None,
            video_duration_secs: None,
        };
        let step = dto.into_domain().unwrap();
        assert_eq!(step.quiz_id(), Some(QuizId::new(42)));
    }

    #[test]
    fn step_without_content_fails() {
        let dto = StepDto {
            id: 7,
            title: "Empty".into(),
            position: 1,
            quiz_id: None,
            video_url: None,
            video_duration_secs: None,
        };
        let err = dto.into_domain().unwrap_err();
        assert!(matches!(err, DecodeError::MissingStepContent { step_id: 7 }));
    }

    #[test]
    fn malformed_video_url_fails() {
        let mut dto = video_step_dto(3, 1);
        dto.video_url = Some("not a url".into());
        let err = dto.into_domain().unwrap_err();
        assert!(matches!(err, DecodeError::InvalidVideoUrl { step_id: 3, .. }));
    }

    #[test]
    fn course_json_round_trips_into_domain() {
        let json = r#"{
            "id": 10,
            "title": "Rust from Zero",
            "price_cents": 19900,
            "duration_secs": 7200,
            "sections": [{
                "id": 1,
                "title": "Basics",
                "position": 1,
                "steps": [
                    {"id": 1, "title": "Intro", "position": 1,
                     "video_url": "https://cdn.example.com/intro.mp4",
                     "video_duration_secs": 300},
                    {"id": 2, "title": "Checkpoint", "position": 2, "quiz_id": 5}
                ]
            }]
        }"#;

        let dto: CourseDto = serde_json::from_str(json).unwrap();
        let course = dto.into_domain().unwrap();
        assert_eq!(course.total_steps(), 2);
        assert_eq!(
            course.find_step(StepId::new(2)).and_then(Step::quiz_id),
            Some(QuizId::new(5))
        );
    }

    #[test]
    fn learning_state_progress_is_validated() {
        let dto = LearningStateDto {
            current_step_id: 1,
            completed_step_ids: vec![],
            learning_progress: 2.0,
        };
        let err = dto.into_domain().unwrap_err();
        assert!(matches!(err, DecodeError::Registration(_)));
    }
}
