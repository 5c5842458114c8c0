use thiserror::Error;

use crate::model::ids::PlacementTestId;
use crate::model::quiz::{Quiz, QuizScore};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlacementError {
    #[error("placement test needs at least one level band")]
    NoBands,

    #[error("level bands must be strictly decreasing in min_correct")]
    UnorderedBands,

    #[error("last level band must accept a score of zero")]
    MissingBaseBand,
}

//
// ─── PLACEMENT TEST ────────────────────────────────────────────────────────────
//

/// Maps a score range onto a recommended course level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelBand {
    pub min_correct: u32,
    pub level: String,
}

/// A quiz used to place a learner, with score bands mapping results to a
/// recommended level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementTest {
    id: PlacementTestId,
    quiz: Quiz,
    bands: Vec<LevelBand>,
}

impl PlacementTest {
    /// Creates a placement test after validating its bands.
    ///
    /// Bands must be strictly decreasing in `min_correct` and end with a band
    /// at zero, so every score maps to a level.
    ///
    /// # Errors
    ///
    /// Returns `PlacementError` if the bands are empty, unordered, or do not
    /// cover a score of zero.
    pub fn new(
        id: PlacementTestId,
        quiz: Quiz,
        bands: Vec<LevelBand>,
    ) -> Result<Self, PlacementError> {
        if bands.is_empty() {
            return Err(PlacementError::NoBands);
        }
        let ordered = bands.windows(2).all(|w| w[0].min_correct > w[1].min_correct);
        if !ordered {
            return Err(PlacementError::UnorderedBands);
        }
        if bands.last().is_some_and(|b| b.min_correct != 0) {
            return Err(PlacementError::MissingBaseBand);
        }

        Ok(Self { id, quiz, bands })
    }

    #[must_use]
    pub fn id(&self) -> PlacementTestId {
        self.id
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn bands(&self) -> &[LevelBand] {
        &self.bands
    }

    /// The level recommended for `score`: the first band whose threshold the
    /// correct-answer count clears. Always succeeds because the last band
    /// accepts zero.
    #[must_use]
    pub fn recommend(&self, score: QuizScore) -> &str {
        self.bands
            .iter()
            .find(|band| score.correct() >= band.min_correct)
            .map_or("", |band| band.level.as_str())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
