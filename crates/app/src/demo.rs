//! Seed data for the offline demo backend.

use api::{ApiError, InMemoryBackend};
use chrono::{Duration, Utc};
use course_core::model::{
    AccountId, Choice, ChoiceId, Course, CourseId, LevelBand, PayoutEntry, PlacementTest,
    PlacementTestId, Question, QuestionId, Quiz, QuizId, Section, SectionId, Step, StepContent,
    StepId,
};

pub const DEMO_COURSE_ID: CourseId = CourseId::new(1);
pub const DEMO_QUIZ_ID: QuizId = QuizId::new(10);
pub const DEMO_PLACEMENT_ID: PlacementTestId = PlacementTestId::new(1);
pub const DEMO_TEACHER: AccountId = AccountId::new(42);

fn video_step(id: u64, title: &str, position: u32) -> Step {
    let url = format!("https://cdn.example.com/videos/{id}.mp4")
        .parse()
        .expect("demo video url");
    Step::new(
        StepId::new(id),
        title,
        position,
        StepContent::Video {
            url,
            duration_secs: 480,
        },
    )
    .expect("demo video step")
}

fn demo_course() -> Course {
    let quiz_step = Step::new(
        StepId::new(3),
        "Ownership checkpoint",
        1,
        StepContent::Quiz {
            quiz_id: DEMO_QUIZ_ID,
        },
    )
    .expect("demo quiz step");

    let basics = Section::new(
        SectionId::new(1),
        "Getting started",
        1,
        vec![
            video_step(1, "Why Rust", 1),
            video_step(2, "Ownership and borrowing", 2),
        ],
    )
    .expect("demo section");
    let wrap_up =
        Section::new(SectionId::new(2), "Wrap up", 2, vec![quiz_step]).expect("demo section");

    Course::new(
        DEMO_COURSE_ID,
        "Rust from Zero",
        Some("A hands-on introduction to Rust".into()),
        19_900,
        7_200,
        None,
        vec![basics, wrap_up],
    )
    .expect("demo course")
}

fn question(id: u64, prompt: &str, right: &str, wrong: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        prompt: prompt.into(),
        choices: vec![
            Choice {
                id: ChoiceId::new(id * 10),
                text: right.into(),
            },
            Choice {
                id: ChoiceId::new(id * 10 + 1),
                text: wrong.into(),
            },
        ],
        correct_choice: ChoiceId::new(id * 10),
    }
}

fn demo_quiz() -> Quiz {
    Quiz::new(
        DEMO_QUIZ_ID,
        "Ownership checkpoint",
        vec![
            question(1, "Who owns a value in Rust?", "Exactly one binding", "Every reference"),
            question(2, "What does `&mut` grant?", "Exclusive access", "Shared access"),
            question(3, "When is a value dropped?", "When its owner goes out of scope", "Never"),
            question(4, "What does `clone` do?", "Deep-copies the value", "Moves the value"),
            question(5, "Can two `&mut` borrows overlap?", "No", "Yes"),
        ],
    )
    .expect("demo quiz")
}

fn demo_placement() -> PlacementTest {
    PlacementTest::new(
        DEMO_PLACEMENT_ID,
        demo_quiz(),
        vec![
            LevelBand {
                min_correct: 4,
                level: "advanced".into(),
            },
            LevelBand {
                min_correct: 2,
                level: "intermediate".into(),
            },
            LevelBand {
                min_correct: 0,
                level: "beginner".into(),
            },
        ],
    )
    .expect("demo placement test")
}

/// Populates the backend with one course, its quiz, a placement test, and a
/// few teacher payouts.
pub fn seed(backend: &InMemoryBackend) -> Result<(), ApiError> {
    backend.insert_course(demo_course())?;
    backend.insert_quiz(demo_quiz())?;
    backend.insert_placement_test(demo_placement())?;

    let now = Utc::now();
    backend.insert_payouts(
        DEMO_TEACHER,
        vec![
            PayoutEntry {
                course_id: DEMO_COURSE_ID,
                amount_cents: 119_400,
                occurred_at: now - Duration::days(40),
            },
            PayoutEntry {
                course_id: DEMO_COURSE_ID,
                amount_cents: 59_700,
                occurred_at: now - Duration::days(5),
            },
        ],
    )?;
    Ok(())
}
