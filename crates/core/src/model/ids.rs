use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Course
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(u64);

/// Unique identifier for a Section within a Course
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(u64);

/// Unique identifier for a Step
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(u64);

/// Unique identifier for a Quiz
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuizId(u64);

/// Unique identifier for a Question within a Quiz
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(u64);

/// Unique identifier for an answer Choice within a Question
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChoiceId(u64);

/// Unique identifier for a Registration
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationId(u64);

/// Unique identifier for a learner or teacher account
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(u64);

/// Unique identifier for a placement test
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementTestId(u64);

macro_rules! id_impls {
    ($($name:ident),+ $(,)?) => {
        $(
            impl $name {
                /// Creates a new id from its raw value.
                #[must_use]
                pub const fn new(id: u64) -> Self {
                    Self(id)
                }

                /// Returns the underlying u64 value.
                #[must_use]
                pub const fn value(&self) -> u64 {
                    self.0
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = ParseIdError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    s.parse::<u64>().map($name::new).map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
                }
            }
        )+
    };
}

id_impls!(
    CourseId,
    SectionId,
    StepId,
    QuizId,
    QuestionId,
    ChoiceId,
    RegistrationId,
    AccountId,
    PlacementTestId,
);

/// Error type for parsing an id from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_id_display() {
        let id = CourseId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn step_id_from_str() {
        let id: StepId = "123".parse().unwrap();
        assert_eq!(id, StepId::new(123));
    }

    #[test]
    fn registration_id_from_str_invalid() {
        let result = "not-a-number".parse::<RegistrationId>();
        assert!(result.is_err());
    }

    #[test]
    fn debug_includes_type_name() {
        assert_eq!(format!("{:?}", QuizId::new(7)), "QuizId(7)");
    }

    #[test]
    fn id_roundtrip() {
        let original = StepId::new(9000);
        let deserialized: StepId = original.to_string().parse().unwrap();
        assert_eq!(original, deserialized);
    }
}
