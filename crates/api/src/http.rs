//! `reqwest`-backed implementation of the backend contracts.

use std::env;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use async_trait::async_trait;

use course_core::model::{
    AccountId, Course, CourseId, LearningState, PayoutEntry, PlacementTest, PlacementTestId, Quiz,
    QuizAnswer, QuizId, Registration, RegistrationId, StepId,
};

use crate::backend::{
    ApiError, AuthoringApi, CourseApi, NewQuizRecord, NewStepRecord, PayoutApi, PlacementApi,
    PlacementSubmission, QuizApi, QuizAttemptRecord, RegistrationApi,
};
use crate::dto::{
    CourseDto, CreateQuizRequest, CreateStepRequest, CreatedDto, LearningStateDto,
    PayoutEntryDto, PlacementSubmitRequest, PlacementTestDto, QuizAnswerDto, QuizAttemptRequest,
    QuizDto, RegisterRequest, RegistrationDto, SubmitStepRequest,
};

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Connection settings for the remote backend.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
}

impl ApiConfig {
    /// Reads `COURSE_API_BASE_URL` and the optional `COURSE_API_TOKEN`.
    ///
    /// Returns `None` when no base URL is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("COURSE_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let bearer_token = env::var("COURSE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Some(Self {
            base_url,
            bearer_token,
        })
    }
}

//
// ─── HTTP BACKEND ──────────────────────────────────────────────────────────────
//

/// HTTPS/JSON client for the course backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.client.get(self.endpoint(path)).query(query))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.client.post(self.endpoint(path)).json(body))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .authorize(self.client.post(self.endpoint(path)).json(body))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if status.is_success() => Ok(()),
            status => Err(ApiError::HttpStatus(status)),
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(ApiError::HttpStatus(status)),
        }
    }
}

fn answers_dto(answers: &[QuizAnswer]) -> Vec<QuizAnswerDto> {
    answers
        .iter()
        .map(|a| QuizAnswerDto {
            question_id: a.question_id.value(),
            choice_id: a.choice_id.value(),
        })
        .collect()
}

#[async_trait]
impl CourseApi for HttpBackend {
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, ApiError> {
        let dtos: Vec<CourseDto> = self
            .get_json("courses", &[("limit", limit.to_string())])
            .await?;
        let courses = dtos
            .into_iter()
            .map(CourseDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    async fn search_courses(&self, query: &str, limit: u32) -> Result<Vec<Course>, ApiError> {
        let dtos: Vec<CourseDto> = self
            .get_json(
                "courses/search",
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        let courses = dtos
            .into_iter()
            .map(CourseDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError> {
        let dto: CourseDto = self.get_json(&format!("courses/{id}"), &[]).await?;
        Ok(dto.into_domain()?)
    }
}

#[async_trait]
impl RegistrationApi for HttpBackend {
    async fn find_registration(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Option<Registration>, ApiError> {
        let result: Result<RegistrationDto, ApiError> = self
            .get_json(
                "registrations",
                &[
                    ("account_id", account.to_string()),
                    ("course_id", course.to_string()),
                ],
            )
            .await;
        match result {
            Ok(dto) => Ok(Some(dto.into_domain()?)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn register(
        &self,
        account: AccountId,
        course: CourseId,
    ) -> Result<Registration, ApiError> {
        let dto: RegistrationDto = self
            .post_json(
                "registrations",
                &RegisterRequest {
                    account_id: account.value(),
                    course_id: course.value(),
                },
            )
            .await?;
        Ok(dto.into_domain()?)
    }

    async fn learning_state(
        &self,
        registration: RegistrationId,
    ) -> Result<LearningState, ApiError> {
        let dto: LearningStateDto = self
            .get_json(&format!("registrations/{registration}/learning-state"), &[])
            .await?;
        Ok(dto.into_domain()?)
    }

    async fn submit_completed_step(
        &self,
        registration: RegistrationId,
        step: StepId,
    ) -> Result<(), ApiError> {
        self.post_unit(
            &format!("registrations/{registration}/completed-step"),
            &SubmitStepRequest {
                step_id: step.value(),
            },
        )
        .await
    }
}

#[async_trait]
impl QuizApi for HttpBackend {
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self.get_json(&format!("quizzes/{id}"), &[]).await?;
        Ok(dto.into_domain()?)
    }

    async fn submit_attempt(&self, attempt: &QuizAttemptRecord) -> Result<(), ApiError> {
        self.post_unit(
            &format!("quizzes/{}/attempts", attempt.quiz_id),
            &QuizAttemptRequest {
                registration_id: attempt.registration_id.value(),
                quiz_id: attempt.quiz_id.value(),
                answers: answers_dto(&attempt.answers),
                correct_count: attempt.score.correct(),
                total_count: attempt.score.total(),
                attempted_at: attempt.attempted_at,
            },
        )
        .await
    }
}

#[async_trait]
impl PlacementApi for HttpBackend {
    async fn get_placement_test(
        &self,
        id: PlacementTestId,
    ) -> Result<PlacementTest, ApiError> {
        let dto: PlacementTestDto = self
            .get_json(&format!("placement-tests/{id}"), &[])
            .await?;
        Ok(dto.into_domain()?)
    }

    async fn submit_placement(&self, submission: &PlacementSubmission) -> Result<(), ApiError> {
        self.post_unit(
            &format!("placement-tests/{}/submissions", submission.test_id),
            &PlacementSubmitRequest {
                account_id: submission.account_id.value(),
                answers: answers_dto(&submission.answers),
                correct_count: submission.score.correct(),
                total_count: submission.score.total(),
                attempted_at: submission.attempted_at,
            },
        )
        .await
    }
}

#[async_trait]
impl AuthoringApi for HttpBackend {
    async fn create_step(&self, record: &NewStepRecord) -> Result<StepId, ApiError> {
        let created: CreatedDto = self
            .post_json(
                "authoring/steps",
                &CreateStepRequest {
                    intent: record.intent,
                    course_id: record.course_id.value(),
                    section_id: record.section_id.value(),
                    title: record.title.clone(),
                    kind: record.kind.into(),
                },
            )
            .await?;
        Ok(StepId::new(created.id))
    }

    async fn create_quiz(&self, record: &NewQuizRecord) -> Result<QuizId, ApiError> {
        let created: CreatedDto = self
            .post_json(
                "authoring/quizzes",
                &CreateQuizRequest {
                    intent: record.intent,
                    step_id: record.step_id.value(),
                    title: record.title.clone(),
                },
            )
            .await?;
        Ok(QuizId::new(created.id))
    }
}

#[async_trait]
impl PayoutApi for HttpBackend {
    async fn payout_entries(&self, account: AccountId) -> Result<Vec<PayoutEntry>, ApiError> {
        let dtos: Vec<PayoutEntryDto> = self
            .get_json(&format!("teachers/{account}/payouts"), &[])
            .await?;
        Ok(dtos.into_iter().map(PayoutEntryDto::into_domain).collect())
    }
}
