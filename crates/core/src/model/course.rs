use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, QuizId, SectionId, StepId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("section title cannot be empty: {section}")]
    EmptySectionTitle { section: SectionId },

    #[error("step title cannot be empty: {step}")]
    EmptyStepTitle { step: StepId },

    #[error("section positions must be strictly increasing")]
    UnorderedSections,

    #[error("step positions must be strictly increasing in section {section}")]
    UnorderedSteps { section: SectionId },

    #[error("duplicate step id {step}")]
    DuplicateStepId { step: StepId },

    #[error("video duration must be > 0 for step {step}")]
    InvalidVideoDuration { step: StepId },
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// What a step asks the learner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Video,
    Quiz,
}

/// Content payload of a step: a watchable video or a quiz reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepContent {
    Video { url: Url, duration_secs: u32 },
    Quiz { quiz_id: QuizId },
}

/// Atomic lesson unit, ordered by `position` within its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    id: StepId,
    title: String,
    position: u32,
    content: StepContent,
}

impl Step {
    /// Creates a step after validating its title and content.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyStepTitle` for a blank title and
    /// `CourseError::InvalidVideoDuration` for a zero-length video.
    pub fn new(
        id: StepId,
        title: impl Into<String>,
        position: u32,
        content: StepContent,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyStepTitle { step: id });
        }
        if let StepContent::Video { duration_secs, .. } = &content {
            if *duration_secs == 0 {
                return Err(CourseError::InvalidVideoDuration { step: id });
            }
        }

        Ok(Self {
            id,
            title,
            position,
            content,
        })
    }

    #[must_use]
    pub fn id(&self) -> StepId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[must_use]
    pub fn content(&self) -> &StepContent {
        &self.content
    }

    /// Video vs quiz, inferred from the content payload.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self.content {
            StepContent::Video { .. } => StepKind::Video,
            StepContent::Quiz { .. } => StepKind::Quiz,
        }
    }

    /// The referenced quiz id, for quiz steps.
    #[must_use]
    pub fn quiz_id(&self) -> Option<QuizId> {
        match self.content {
            StepContent::Quiz { quiz_id } => Some(quiz_id),
            StepContent::Video { .. } => None,
        }
    }

    /// The video URL, for video steps.
    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        match &self.content {
            StepContent::Video { url, .. } => Some(url),
            StepContent::Quiz { .. } => None,
        }
    }
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// Ordered group of steps within a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    title: String,
    position: u32,
    steps: Vec<Step>,
}

impl Section {
    /// Creates a section after validating its title and step ordering.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptySectionTitle` for a blank title and
    /// `CourseError::UnorderedSteps` if step positions are not strictly
    /// increasing.
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        position: u32,
        steps: Vec<Step>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptySectionTitle { section: id });
        }
        let ordered = steps.windows(2).all(|w| w[0].position() < w[1].position());
        if !ordered {
            return Err(CourseError::UnorderedSteps { section: id });
        }

        Ok(Self {
            id,
            title,
            position,
            steps,
        })
    }

    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Aggregate of ordered sections, each an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    price_cents: u32,
    duration_secs: u32,
    cover_url: Option<Url>,
    sections: Vec<Section>,
}

impl Course {
    /// Creates a course after validating titles, ordering, and step id
    /// uniqueness across all sections.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title is blank, section positions are not
    /// strictly increasing, or a step id appears twice.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        price_cents: u32,
        duration_secs: u32,
        cover_url: Option<Url>,
        sections: Vec<Section>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let ordered = sections
            .windows(2)
            .all(|w| w[0].position() < w[1].position());
        if !ordered {
            return Err(CourseError::UnorderedSections);
        }

        let mut seen = std::collections::HashSet::new();
        for section in &sections {
            for step in section.steps() {
                if !seen.insert(step.id()) {
                    return Err(CourseError::DuplicateStepId { step: step.id() });
                }
            }
        }

        Ok(Self {
            id,
            title,
            description,
            price_cents,
            duration_secs,
            cover_url,
            sections,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn price_cents(&self) -> u32 {
        self.price_cents
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn cover_url(&self) -> Option<&Url> {
        self.cover_url.as_ref()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Iterates all steps in course order (section position, then step position).
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.sections.iter().flat_map(|s| s.steps().iter())
    }

    /// Total number of steps across all sections.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.sections.iter().map(|s| s.steps().len()).sum()
    }

    /// Looks up a step by id across all sections.
    #[must_use]
    pub fn find_step(&self, id: StepId) -> Option<&Step> {
        self.steps().find(|step| step.id() == id)
    }

    /// The step that follows `id` in course order, if any.
    #[must_use]
    pub fn next_step_after(&self, id: StepId) -> Option<&Step> {
        let mut steps = self.steps();
        steps.find(|step| step.id() == id)?;
        steps.next()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn video_step(id: u64, position: u32) -> Step {
        Step::new(
            StepId::new(id),
            format!("Step {id}"),
            position,
            StepContent::Video {
                url: Url::parse("https://cdn.example.com/video.mp4").unwrap(),
                duration_secs: 300,
            },
        )
        .unwrap()
    }

    fn quiz_step(id: u64, position: u32, quiz: u64) -> Step {
        Step::new(
            StepId::new(id),
            format!("Quiz {id}"),
            position,
            StepContent::Quiz {
                quiz_id: QuizId::new(quiz),
            },
        )
        .unwrap()
    }

    fn build_course(sections: Vec<Section>) -> Result<Course, CourseError> {
        Course::new(
            CourseId::new(1),
            "Rust from Zero",
            None,
            19_900,
            7_200,
            None,
            sections,
        )
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = Course::new(CourseId::new(1), "  ", None, 0, 0, None, Vec::new()).unwrap_err();
        assert!(matches!(err, CourseError::EmptyTitle));
    }

    #[test]
    fn step_kind_follows_content() {
        let video = video_step(1, 1);
        assert_eq!(video.kind(), StepKind::Video);
        assert_eq!(video.quiz_id(), None);

        let quiz = quiz_step(2, 2, 10);
        assert_eq!(quiz.kind(), StepKind::Quiz);
        assert_eq!(quiz.quiz_id(), Some(QuizId::new(10)));
        assert!(quiz.video_url().is_none());
    }

    #[test]
    fn zero_length_video_is_rejected() {
        let err = Step::new(
            StepId::new(1),
            "Intro",
            1,
            StepContent::Video {
                url: Url::parse("https://cdn.example.com/v.mp4").unwrap(),
                duration_secs: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CourseError::InvalidVideoDuration { .. }));
    }

    #[test]
    fn unordered_steps_are_rejected() {
        let err = Section::new(
            SectionId::new(1),
            "Basics",
            1,
            vec![video_step(1, 2), video_step(2, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, CourseError::UnorderedSteps { .. }));
    }

    #[test]
    fn duplicate_step_ids_across_sections_are_rejected() {
        let first = Section::new(SectionId::new(1), "One", 1, vec![video_step(1, 1)]).unwrap();
        let second = Section::new(SectionId::new(2), "Two", 2, vec![video_step(1, 1)]).unwrap();
        let err = build_course(vec![first, second]).unwrap_err();
        assert!(matches!(err, CourseError::DuplicateStepId { .. }));
    }

    #[test]
    fn find_step_spans_sections() {
        let first = Section::new(
            SectionId::new(1),
            "One",
            1,
            vec![video_step(1, 1), video_step(2, 2)],
        )
        .unwrap();
        let second = Section::new(SectionId::new(2), "Two", 2, vec![quiz_step(3, 1, 10)]).unwrap();
        let course = build_course(vec![first, second]).unwrap();

        assert_eq!(course.total_steps(), 3);
        assert_eq!(
            course.find_step(StepId::new(3)).map(Step::kind),
            Some(StepKind::Quiz)
        );
        assert!(course.find_step(StepId::new(99)).is_none());
    }

    #[test]
    fn next_step_crosses_section_boundary() {
        let first = Section::new(SectionId::new(1), "One", 1, vec![video_step(1, 1)]).unwrap();
        let second = Section::new(SectionId::new(2), "Two", 2, vec![video_step(2, 1)]).unwrap();
        let course = build_course(vec![first, second]).unwrap();

        let next = course.next_step_after(StepId::new(1)).unwrap();
        assert_eq!(next.id(), StepId::new(2));
        assert!(course.next_step_after(StepId::new(2)).is_none());
    }
}
