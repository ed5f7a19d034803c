use chrono::NaiveDate;

use crate::model::{RecallQuality, ReviewState};

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// SM-2 style scheduler for vocabulary review.
///
/// Stateless: every call maps a `ReviewState` and a recall quality to the
/// next `ReviewState`. Persisting the result is the caller's job.
///
/// - A failed recall (quality below 3) resets repetitions and schedules the
///   word for tomorrow, leaving the ease factor alone.
/// - A successful recall grows the interval 1 → 6 → `ceil(interval * ease)`
///   days, capped at `ReviewState::MAX_INTERVAL_DAYS`, and nudges the ease
///   factor, never below 1.3.
///
/// # Examples
///
/// ```
/// # use coach_core::scheduler::ReviewScheduler;
/// # use coach_core::model::{RecallQuality, ReviewState};
/// let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let scheduler = ReviewScheduler::new();
/// let state = ReviewState::new(today);
///
/// let next = scheduler.apply(&state, RecallQuality::new(5)?, today);
/// assert_eq!(next.repetitions(), 1);
/// assert_eq!(next.interval_days(), 1);
/// # Ok::<(), coach_core::model::ReviewError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewScheduler;

impl ReviewScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute the state after a review graded `quality` on `today`.
    #[must_use]
    pub fn apply(
        &self,
        state: &ReviewState,
        quality: RecallQuality,
        today: NaiveDate,
    ) -> ReviewState {
        if quality.is_failure() {
            return ReviewState::scheduled(1, 0, state.ease_factor(), today);
        }

        let interval_days = match state.repetitions() {
            0 => 1,
            1 => 6,
            _ => grown_interval(state.interval_days(), state.ease_factor()),
        };

        let ease_factor = next_ease_factor(state.ease_factor(), quality);

        ReviewState::scheduled(
            interval_days,
            state.repetitions().saturating_add(1),
            ease_factor,
            today,
        )
    }
}

/// `EF' = max(1.3, EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)))`
fn next_ease_factor(ease_factor: f64, quality: RecallQuality) -> f64 {
    let miss = f64::from(RecallQuality::MAX - quality.value());
    let delta = 0.1 - miss * (0.08 + miss * 0.02);
    (ease_factor + delta).max(ReviewState::MIN_EASE_FACTOR)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn grown_interval(interval_days: u32, ease_factor: f64) -> u32 {
    let grown = (f64::from(interval_days) * ease_factor).ceil();
    if grown >= f64::from(ReviewState::MAX_INTERVAL_DAYS) {
        ReviewState::MAX_INTERVAL_DAYS
    } else {
        grown as u32
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
