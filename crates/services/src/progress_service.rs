use std::sync::Arc;

use tracing::{debug, info};

use coach_core::model::{LearnerProgress, LevelResult, SentenceId, SentenceRecord};
use coach_core::time::Clock;
use storage::repository::{KeyValueStore, KeyValueStoreExt};

use crate::error::ProgressError;
use crate::keys;

/// Number of corrected sentences kept.
pub const SENTENCE_HISTORY_CAPACITY: usize = 100;

/// Streak tracking, writing history and the saved level.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { clock, kv }
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if progress cannot be read.
    pub async fn progress(&self) -> Result<LearnerProgress, ProgressError> {
        Ok(self
            .kv
            .get_json(keys::USER_PROGRESS)
            .await?
            .unwrap_or_default())
    }

    /// Count today as a practice day and return the updated streak.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if progress cannot be read or written.
    pub async fn record_activity(&self) -> Result<LearnerProgress, ProgressError> {
        let mut progress = self.progress().await?;
        if progress.record_activity(self.clock.today()) {
            self.kv.set_json(keys::USER_PROGRESS, &progress).await?;
            debug!(streak = progress.streak, total_days = progress.total_days, "activity recorded");
        }
        Ok(progress)
    }

    /// Corrected sentences, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the history cannot be read.
    pub async fn sentences(&self) -> Result<Vec<SentenceRecord>, ProgressError> {
        Ok(self
            .kv
            .get_json(keys::SENTENCE_HISTORY)
            .await?
            .unwrap_or_default())
    }

    /// Save a corrected sentence at the front of the history.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptySentence` for blank input and `Storage` if
    /// the history cannot be read or written.
    pub async fn add_sentence(
        &self,
        original: &str,
        corrected: &str,
        feedback: &str,
    ) -> Result<SentenceRecord, ProgressError> {
        let original = original.trim();
        if original.is_empty() {
            return Err(ProgressError::EmptySentence);
        }
        let record = SentenceRecord {
            id: SentenceId::generate(),
            original: original.to_string(),
            corrected: corrected.trim().to_string(),
            feedback: feedback.trim().to_string(),
            timestamp: self.clock.now(),
        };

        let mut history = self.sentences().await?;
        history.insert(0, record.clone());
        history.truncate(SENTENCE_HISTORY_CAPACITY);
        self.kv.set_json(keys::SENTENCE_HISTORY, &history).await?;
        Ok(record)
    }

    /// The last saved level-test result.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the result cannot be read.
    pub async fn user_level(&self) -> Result<Option<LevelResult>, ProgressError> {
        Ok(self.kv.get_json(keys::USER_LEVEL).await?)
    }

    /// Remove everything in the store.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if any key cannot be listed or removed.
    pub async fn clear_all(&self) -> Result<(), ProgressError> {
        let keys = self.kv.keys().await?;
        for key in &keys {
            self.kv.remove(key).await?;
        }
        info!(removed = keys.len(), "cleared all learner data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use coach_core::model::{CefrLevel, Placement};
    use coach_core::time::fixed_now;
    use storage::repository::InMemoryStore;

    fn service_at(offset_days: i64, store: &InMemoryStore) -> ProgressService {
        ProgressService::new(
            Clock::Fixed(fixed_now() + Duration::days(offset_days)),
            Arc::new(store.clone()),
        )
    }

    #[tokio::test]
    async fn streak_follows_consecutive_days() {
        let store = InMemoryStore::new();
        assert_eq!(service_at(0, &store).record_activity().await.unwrap().streak, 1);
        assert_eq!(service_at(0, &store).record_activity().await.unwrap().streak, 1);
        assert_eq!(service_at(1, &store).record_activity().await.unwrap().streak, 2);

        let after_gap = service_at(5, &store).record_activity().await.unwrap();
        assert_eq!(after_gap.streak, 1);
        assert_eq!(after_gap.total_days, 3);
        assert_eq!(service_at(5, &store).progress().await.unwrap(), after_gap);
    }

    #[tokio::test]
    async fn sentence_history_is_capped_newest_first() {
        let store = InMemoryStore::new();
        let service = service_at(0, &store);
        for i in 0..105 {
            service
                .add_sentence(&format!("I goed {i}"), &format!("I went {i}"), "past tense")
                .await
                .unwrap();
        }
        let history = service.sentences().await.unwrap();
        assert_eq!(history.len(), SENTENCE_HISTORY_CAPACITY);
        assert_eq!(history[0].original, "I goed 104");
        assert_eq!(history[99].original, "I goed 5");
    }

    #[tokio::test]
    async fn blank_sentence_is_rejected() {
        let store = InMemoryStore::new();
        let err = service_at(0, &store)
            .add_sentence(" ", "x", "y")
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::EmptySentence));
    }

    #[tokio::test]
    async fn clear_all_removes_every_key() {
        let store = InMemoryStore::new();
        let service = service_at(0, &store);
        service.record_activity().await.unwrap();
        service.add_sentence("a", "b", "c").await.unwrap();
        let result = LevelResult {
            placement: Placement::Level(CefrLevel::B1),
            date: fixed_now().date_naive(),
            score: 8,
        };
        store.set_json(keys::USER_LEVEL, &result).await.unwrap();
        assert_eq!(service.user_level().await.unwrap(), Some(result));

        service.clear_all().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
        assert_eq!(service.user_level().await.unwrap(), None);
        assert_eq!(service.progress().await.unwrap(), LearnerProgress::default());
    }
}
