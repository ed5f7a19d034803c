use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use coach_core::{
    model::{RecallQuality, ReviewState, VocabularyError, VocabularyItem, word_key},
    scheduler::ReviewScheduler,
    time::Clock,
};
use storage::repository::{KeyValueStore, KeyValueStoreExt, StorageError};

use crate::error::ReviewServiceError;
use crate::keys;

/// Review states keyed by lower-cased word.
type ProgressMap = BTreeMap<String, ReviewState>;

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Keeps the learner's word list and applies graded reviews to it.
#[derive(Clone)]
pub struct ReviewService {
    clock: Clock,
    scheduler: ReviewScheduler,
    kv: Arc<dyn KeyValueStore>,
}

impl ReviewService {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            scheduler: ReviewScheduler::new(),
            kv,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Saved words in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if the list cannot be read.
    pub async fn words(&self) -> Result<Vec<VocabularyItem>, ReviewServiceError> {
        Ok(self.kv.get_json(keys::VOCABULARY).await?.unwrap_or_default())
    }

    /// Add `item` to the word list. Returns false if the word was already saved.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if the list cannot be read or written.
    pub async fn add_word(&self, item: VocabularyItem) -> Result<bool, ReviewServiceError> {
        let mut words = self.words().await?;
        if words.iter().any(|existing| existing.key() == item.key()) {
            return Ok(false);
        }
        debug!(word = item.word(), "adding word");
        words.push(item);
        self.kv.set_json(keys::VOCABULARY, &words).await?;
        Ok(true)
    }

    /// Current review state for `word`, if it has been reviewed.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if progress cannot be read, which
    /// includes a stored state that violates the scheduling invariants.
    pub async fn state(&self, word: &str) -> Result<Option<ReviewState>, ReviewServiceError> {
        Ok(self.progress().await?.remove(&word_key(word)))
    }

    /// Apply a review of `word` graded `quality` today and persist the result.
    ///
    /// The first review of a word starts from a fresh state due today. The
    /// stored state is replaced only after the new one has been computed, so a
    /// storage failure leaves the previous state in place.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Vocabulary` for a blank word and
    /// `ReviewServiceError::Storage` if progress cannot be read or written.
    pub async fn review(
        &self,
        word: &str,
        quality: RecallQuality,
    ) -> Result<ReviewState, ReviewServiceError> {
        let key = word_key(word);
        if key.is_empty() {
            return Err(VocabularyError::EmptyWord.into());
        }

        let today = self.clock.today();
        let mut progress = self.progress().await?;
        let current = progress
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ReviewState::new(today));
        let next = self.scheduler.apply(&current, quality, today);

        progress.insert(key.clone(), next.clone());
        self.kv
            .set_json(keys::VOCABULARY_PROGRESS, &progress)
            .await?;
        debug!(
            word = %key,
            quality = quality.value(),
            interval_days = next.interval_days(),
            next_review = %next.next_review_date(),
            "review applied"
        );
        Ok(next)
    }

    /// Saved words due on the clock's current date.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if words or progress cannot be read.
    pub async fn due_words(&self) -> Result<Vec<VocabularyItem>, ReviewServiceError> {
        self.due_words_on(self.clock.today()).await
    }

    /// Saved words due on `today`. Words never reviewed are always due.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if words or progress cannot be read.
    pub async fn due_words_on(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<VocabularyItem>, ReviewServiceError> {
        let progress = self.progress().await?;
        let mut words = self.words().await?;
        words.retain(|item| {
            progress
                .get(&item.key())
                .is_none_or(|state| state.is_due(today))
        });
        Ok(words)
    }

    async fn progress(&self) -> Result<ProgressMap, StorageError> {
        Ok(self
            .kv
            .get_json(keys::VOCABULARY_PROGRESS)
            .await?
            .unwrap_or_default())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
