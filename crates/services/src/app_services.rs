use std::sync::Arc;

use api::{
    ApiConfig, AuthoringApi, CourseApi, HttpBackend, PayoutApi, PlacementApi, QuizApi,
    RegistrationApi,
};

use crate::Clock;
use crate::authoring_service::AuthoringService;
use crate::catalog_service::CatalogService;
use crate::lesson::LessonFlowService;
use crate::payout_service::PayoutService;
use crate::placement_service::PlacementService;
use crate::registration_service::RegistrationService;

/// Assembles the app-facing services over one backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    registrations: Arc<RegistrationService>,
    lesson_flow: Arc<LessonFlowService>,
    placement: Arc<PlacementService>,
    authoring: Arc<AuthoringService>,
    payouts: Arc<PayoutService>,
}

impl AppServices {
    /// Build services over any backend implementing the full client surface.
    pub fn with_backend<B>(backend: Arc<B>, clock: Clock) -> Self
    where
        B: CourseApi + RegistrationApi + QuizApi + PlacementApi + AuthoringApi + PayoutApi + 'static,
    {
        let courses: Arc<dyn CourseApi> = backend.clone();
        let registrations: Arc<dyn RegistrationApi> = backend.clone();
        let quizzes: Arc<dyn QuizApi> = backend.clone();
        let placements: Arc<dyn PlacementApi> = backend.clone();
        let authoring: Arc<dyn AuthoringApi> = backend.clone();
        let payouts: Arc<dyn PayoutApi> = backend;

        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&courses))),
            registrations: Arc::new(RegistrationService::new(Arc::clone(&registrations))),
            lesson_flow: Arc::new(LessonFlowService::new(
                clock,
                courses,
                registrations,
                quizzes,
            )),
            placement: Arc::new(PlacementService::new(clock, placements)),
            authoring: Arc::new(AuthoringService::new(authoring)),
            payouts: Arc::new(PayoutService::new(payouts)),
        }
    }

    /// Build services talking to the remote backend over HTTPS/JSON.
    #[must_use]
    pub fn new_http(config: ApiConfig, clock: Clock) -> Self {
        Self::with_backend(Arc::new(HttpBackend::new(config)), clock)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn registrations(&self) -> Arc<RegistrationService> {
        Arc::clone(&self.registrations)
    }

    #[must_use]
    pub fn lesson_flow(&self) -> Arc<LessonFlowService> {
        Arc::clone(&self.lesson_flow)
    }

    #[must_use]
    pub fn placement(&self) -> Arc<PlacementService> {
        Arc::clone(&self.placement)
    }

    #[must_use]
    pub fn authoring(&self) -> Arc<AuthoringService> {
        Arc::clone(&self.authoring)
    }

    #[must_use]
    pub fn payouts(&self) -> Arc<PayoutService> {
        Arc::clone(&self.payouts)
    }
}
