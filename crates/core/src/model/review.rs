use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur during review operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReviewError {
    #[error("invalid recall quality value: {0}")]
    InvalidQuality(u8),
    #[error("interval must be between 1 and {max} days, got {provided}")]
    InvalidInterval { provided: u32, max: u32 },
    #[error("ease factor must be at least {min}, got {provided}")]
    InvalidEaseFactor { provided: f64, min: f64 },
}

//
// ─── RECALL QUALITY ───────────────────────────────────────────────────────────
//

/// Six-level self-assessment of how well a word was recalled.
///
/// `0` is a complete blackout, `5` a perfect, effortless answer. Anything
/// below `3` counts as a failed recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RecallQuality(u8);

impl RecallQuality {
    pub const MAX: u8 = 5;
    /// Lowest quality that still counts as a successful recall.
    pub const PASSING: u8 = 3;

    /// Builds a quality rating from a raw value.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidQuality` if the value is above 5.
    pub fn new(value: u8) -> Result<Self, ReviewError> {
        if value > Self::MAX {
            return Err(ReviewError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_failure(self) -> bool {
        self.0 < Self::PASSING
    }
}

impl TryFrom<u8> for RecallQuality {
    type Error = ReviewError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecallQuality> for u8 {
    fn from(quality: RecallQuality) -> Self {
        quality.0
    }
}

//
// ─── REVIEW STATE ─────────────────────────────────────────────────────────────
//

/// Per-word spaced-repetition metadata.
///
/// Created on first review, mutated only through
/// [`ReviewScheduler::apply`](crate::scheduler::ReviewScheduler::apply).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReviewStateRecord", into = "ReviewStateRecord")]
pub struct ReviewState {
    interval_days: u32,
    repetitions: u32,
    ease_factor: f64,
    next_review_date: NaiveDate,
}

impl ReviewState {
    pub const MIN_EASE_FACTOR: f64 = 1.3;
    pub const INITIAL_EASE_FACTOR: f64 = 2.5;
    /// Longest interval the scheduler hands out, about a century.
    pub const MAX_INTERVAL_DAYS: u32 = 36_500;

    /// State for a word that has never been reviewed; due immediately.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            interval_days: 1,
            repetitions: 0,
            ease_factor: Self::INITIAL_EASE_FACTOR,
            next_review_date: today,
        }
    }

    /// Rehydrate a state from storage, checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError` if the interval is zero or above
    /// `MAX_INTERVAL_DAYS`, or the ease factor is below the floor (or not finite).
    pub fn from_persisted(
        interval_days: u32,
        repetitions: u32,
        ease_factor: f64,
        next_review_date: NaiveDate,
    ) -> Result<Self, ReviewError> {
        if interval_days == 0 || interval_days > Self::MAX_INTERVAL_DAYS {
            return Err(ReviewError::InvalidInterval {
                provided: interval_days,
                max: Self::MAX_INTERVAL_DAYS,
            });
        }
        if !ease_factor.is_finite() || ease_factor < Self::MIN_EASE_FACTOR {
            return Err(ReviewError::InvalidEaseFactor {
                provided: ease_factor,
                min: Self::MIN_EASE_FACTOR,
            });
        }
        Ok(Self {
            interval_days,
            repetitions,
            ease_factor,
            next_review_date,
        })
    }

    /// Crate-internal constructor used by the scheduler, which upholds the invariants.
    pub(crate) fn scheduled(
        interval_days: u32,
        repetitions: u32,
        ease_factor: f64,
        today: NaiveDate,
    ) -> Self {
        let interval_days = interval_days.clamp(1, Self::MAX_INTERVAL_DAYS);
        Self {
            interval_days,
            repetitions,
            ease_factor: ease_factor.max(Self::MIN_EASE_FACTOR),
            next_review_date: today
                .checked_add_days(Days::new(u64::from(interval_days)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    #[must_use]
    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    #[must_use]
    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    #[must_use]
    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    #[must_use]
    pub fn next_review_date(&self) -> NaiveDate {
        self.next_review_date
    }

    /// Returns true when the word should be reviewed on `today`.
    #[must_use]
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}

/// Serialized shape of `ReviewState`; deserializing goes through `from_persisted`.
#[derive(Serialize, Deserialize)]
struct ReviewStateRecord {
    interval_days: u32,
    repetitions: u32,
    ease_factor: f64,
    next_review_date: NaiveDate,
}

impl TryFrom<ReviewStateRecord> for ReviewState {
    type Error = ReviewError;

    fn try_from(record: ReviewStateRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(
            record.interval_days,
            record.repetitions,
            record.ease_factor,
            record.next_review_date,
        )
    }
}

impl From<ReviewState> for ReviewStateRecord {
    fn from(state: ReviewState) -> Self {
        Self {
            interval_days: state.interval_days,
            repetitions: state.repetitions,
            ease_factor: state.ease_factor,
            next_review_date: state.next_review_date,
        }
    }
}
