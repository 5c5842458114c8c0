use std::sync::Arc;

use api::{ApiError, CourseApi};
use course_core::model::{Course, CourseId};

use crate::error::CatalogError;

/// Course catalog browsing and search.
#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CourseApi>,
}

impl CatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseApi>) -> Self {
        Self { courses }
    }

    /// List catalog courses, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` if the backend call fails.
    pub async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, CatalogError> {
        let courses = self.courses.list_courses(limit).await?;
        Ok(courses)
    }

    /// Search courses by title. A blank query falls back to the plain
    /// catalog listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` if the backend call fails.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Course>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_courses(limit).await;
        }
        let courses = self.courses.search_courses(query, limit).await?;
        Ok(courses)
    }

    /// Fetch one course with its full section/step structure.
    ///
    /// Returns `Ok(None)` when the course does not exist, so callers can
    /// route to a fallback page.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` for other backend failures.
    pub async fn course_detail(&self, id: CourseId) -> Result<Option<Course>, CatalogError> {
        match self.courses.get_course(id).await {
            Ok(course) => Ok(Some(course)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::InMemoryBackend;
    use course_core::model::{Section, SectionId, Step, StepContent, StepId};

    fn course(id: u64, title: &str) -> Course {
        let step = Step::new(
            StepId::new(id * 100),
            "Intro",
            1,
            StepContent::Video {
                url: "https://cdn.example.com/v.mp4".parse().unwrap(),
                duration_secs: 60,
            },
        )
        .unwrap();
        let section = Section::new(SectionId::new(id * 10), "Basics", 1, vec![step]).unwrap();
        Course::new(CourseId::new(id), title, None, 9_900, 3_600, None, vec![section]).unwrap()
    }

    fn service(backend: &InMemoryBackend) -> CatalogService {
        CatalogService::new(Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn search_matches_case_insensitively() {
        let backend = InMemoryBackend::new();
        backend.insert_course(course(1, "Rust from Zero")).unwrap();
        backend.insert_course(course(2, "Advanced Gardening")).unwrap();

        let found = service(&backend).search("rust", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), CourseId::new(1));
    }

    #[tokio::test]
    async fn blank_query_lists_the_catalog() {
        let backend = InMemoryBackend::new();
        backend.insert_course(course(1, "Rust from Zero")).unwrap();
        backend.insert_course(course(2, "Advanced Gardening")).unwrap();

        let found = service(&backend).search("   ", 10).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn missing_course_detail_is_none() {
        let backend = InMemoryBackend::new();
        let detail = service(&backend)
            .course_detail(CourseId::new(404))
            .await
            .unwrap();
        assert!(detail.is_none());
    }
}
