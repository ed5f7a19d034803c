use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::cefr::Placement;
use crate::model::ids::SentenceId;

/// Daily practice streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProgress {
    pub streak: u32,
    pub last_date: Option<NaiveDate>,
    pub total_days: u32,
}

impl LearnerProgress {
    /// Records practice on `today`.
    ///
    /// Repeated calls on the same day are no-ops. A consecutive day extends
    /// the streak; any gap (or a clock that moved backwards) restarts it at 1.
    /// Returns true if anything changed.
    pub fn record_activity(&mut self, today: NaiveDate) -> bool {
        match self.last_date {
            Some(last) if last == today => return false,
            Some(last) if last.succ_opt() == Some(today) => {
                self.streak = self.streak.saturating_add(1);
            }
            _ => self.streak = 1,
        }
        self.last_date = Some(today);
        self.total_days = self.total_days.saturating_add(1);
        true
    }
}

/// Result of the most recent level test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelResult {
    pub placement: Placement,
    pub date: NaiveDate,
    pub score: u32,
}

/// A corrected piece of writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub id: SentenceId,
    pub original: String,
    pub corrected: String,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        crate::time::fixed_now().date_naive() + Duration::days(offset)
    }

    #[test]
    fn streak_extends_on_consecutive_days() {
        let mut progress = LearnerProgress::default();
        assert!(progress.record_activity(day(0)));
        assert!(!progress.record_activity(day(0)));
        assert!(progress.record_activity(day(1)));
        assert_eq!(progress.streak, 2);
        assert_eq!(progress.total_days, 2);
    }

    #[test]
    fn streak_resets_after_gap() {
        let mut progress = LearnerProgress::default();
        progress.record_activity(day(0));
        progress.record_activity(day(1));
        progress.record_activity(day(5));
        assert_eq!(progress.streak, 1);
        assert_eq!(progress.total_days, 3);
        assert_eq!(progress.last_date, Some(day(5)));
    }
}
