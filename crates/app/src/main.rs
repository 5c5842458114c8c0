//! Headless walkthrough binary.
//!
//! With `COURSE_API_BASE_URL` set it talks to the real backend and shows the
//! catalog plus the caller's lesson outline. Without it, it runs the full
//! learner journey against a seeded in-memory backend.

use std::fmt;
use std::sync::Arc;

use api::{ApiConfig, InMemoryBackend};
use course_core::Clock;
use course_core::model::{AccountId, CourseId, StepKind};
use services::AppServices;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    course_id: CourseId,
    account_id: AccountId,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--course-id <id>] [--account-id <id>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_API_BASE_URL   remote backend; offline demo when unset");
    eprintln!("  COURSE_API_TOKEN      optional bearer token");
    eprintln!("  COURSE_ID, ACCOUNT_ID defaults for the flags above");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut course_id = std::env::var("COURSE_ID")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(demo::DEMO_COURSE_ID);
        let mut account_id = std::env::var("ACCOUNT_ID")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(AccountId::new(1));

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--course-id" => {
                    let value = require_value(args, "--course-id")?;
                    course_id = value.parse().map_err(|_| ArgsError::InvalidId {
                        flag: "--course-id",
                        raw: value.clone(),
                    })?;
                }
                "--account-id" => {
                    let value = require_value(args, "--account-id")?;
                    account_id = value.parse().map_err(|_| ArgsError::InvalidId {
                        flag: "--account-id",
                        raw: value.clone(),
                    })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            course_id,
            account_id,
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut raw_args = std::env::args().skip(1);
    let args = match Args::parse(&mut raw_args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            std::process::exit(2);
        }
    };

    let result = match ApiConfig::from_env() {
        Some(config) => {
            info!(base_url = %config.base_url, "using remote backend");
            run_online(&AppServices::new_http(config, Clock::default_clock()), &args).await
        }
        None => {
            info!("no backend configured, running the offline demo");
            run_demo(&args).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run_online(
    services: &AppServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let courses = services.catalog().list_courses(10).await?;
    println!("Catalog ({} courses):", courses.len());
    for course in &courses {
        println!(
            "  [{}] {} ({} steps, {} cents)",
            course.id(),
            course.title(),
            course.total_steps(),
            course.price_cents()
        );
    }

    let Some(registration) = services
        .registrations()
        .find(args.account_id, args.course_id)
        .await?
    else {
        println!(
            "Account {} has no registration for course {}.",
            args.account_id, args.course_id
        );
        return Ok(());
    };

    let state = services
        .lesson_flow()
        .start(args.course_id, registration.id())
        .await?;
    print_outline(&state);
    Ok(())
}

async fn run_demo(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let backend = InMemoryBackend::new();
    demo::seed(&backend)?;
    let services = AppServices::with_backend(Arc::new(backend), Clock::default_clock());

    // Browse and purchase.
    let courses = services.catalog().search("rust", 10).await?;
    println!("Found {} course(s) for \"rust\".", courses.len());
    let registration = services
        .registrations()
        .register(args.account_id, demo::DEMO_COURSE_ID)
        .await?;
    println!("Registered as registration {}.", registration.id());

    // Work through every step.
    let flow = services.lesson_flow();
    let mut state = flow.start(demo::DEMO_COURSE_ID, registration.id()).await?;
    loop {
        print_outline(&state);
        match state.active_kind() {
            StepKind::Video => {
                state.mark_video_ended();
                flow.complete_current_video(&mut state).await?;
            }
            StepKind::Quiz => {
                let mut session = flow.open_quiz(&state).await?;
                for question in session.quiz().questions().to_vec() {
                    session.select_answer(question.id, question.correct_choice)?;
                }
                let score = session.check()?;
                println!(
                    "Quiz checked: {}/{} correct.",
                    score.correct(),
                    score.total()
                );
                flow.record_attempt(&state, &session).await?;
                flow.continue_after_quiz(&mut state, &session).await?;
            }
        }
        if (state.progress() - 1.0).abs() < f32::EPSILON {
            break;
        }
    }
    println!("Course complete.");

    // Placement test run.
    let placement = services.placement();
    let mut session = placement.start(demo::DEMO_PLACEMENT_ID).await?;
    let questions: Vec<_> = session
        .questions()
        .iter()
        .map(|q| (q.id, q.correct_choice))
        .collect();
    for (question, correct) in questions {
        session.select_answer(question, correct)?;
    }
    let outcome = placement.finish(args.account_id, &mut session).await?;
    println!(
        "Placement: {}/{} correct, recommended level \"{}\".",
        outcome.score.correct(),
        outcome.score.total(),
        outcome.level
    );

    // Teacher payout dashboard.
    let summary = services.payouts().summary(demo::DEMO_TEACHER).await?;
    println!("Teacher payouts: {} cents total.", summary.total_cents());
    for month in summary.months() {
        println!("  {:04}-{:02}: {} cents", month.year, month.month, month.amount_cents);
    }

    Ok(())
}

fn print_outline(state: &services::LessonState) {
    println!(
        "Course \"{}\": progress {:.0}%",
        state.course().title(),
        f64::from(state.progress()) * 100.0
    );
    for row in state.outline() {
        let marker = if row.active {
            ">"
        } else if row.completed {
            "x"
        } else if row.unlocked {
            "o"
        } else {
            "-"
        };
        let kind = match row.kind {
            StepKind::Video => "video",
            StepKind::Quiz => "quiz",
        };
        println!("  {marker} [{kind}] {}", row.title);
    }
}
