use std::sync::Arc;

use tracing::{debug, warn};

use coach_core::model::SentenceRecord;

use crate::ai::AiGateway;
use crate::error::{ProgressError, WritingServiceError};
use crate::progress_service::ProgressService;

/// Grammar correction of learner writing, saved to the sentence history.
#[derive(Clone)]
pub struct WritingService {
    gateway: Option<Arc<dyn AiGateway>>,
    progress: Arc<ProgressService>,
}

impl WritingService {
    #[must_use]
    pub fn new(gateway: Option<Arc<dyn AiGateway>>, progress: Arc<ProgressService>) -> Self {
        Self { gateway, progress }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.gateway.is_some()
    }

    /// Correct `text`, save the result at the front of the sentence history
    /// and count today as a practice day.
    ///
    /// Nothing is saved when the gateway fails.
    ///
    /// # Errors
    ///
    /// Returns `WritingServiceError::Progress` for blank text (before any I/O)
    /// or a storage failure, `Disabled` without a gateway, and `Gateway` when
    /// the vendor call fails.
    pub async fn correct(&self, text: &str) -> Result<SentenceRecord, WritingServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ProgressError::EmptySentence.into());
        }
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(WritingServiceError::Disabled)?;

        let correction = gateway
            .correct_grammar(text)
            .await
            .inspect_err(|err| warn!(error = %err, "grammar correction failed"))?;

        let record = self
            .progress
            .add_sentence(text, &correction.corrected, &correction.feedback)
            .await?;
        self.progress.record_activity().await?;
        debug!(id = %record.id, changed = record.original != record.corrected, "sentence corrected");
        Ok(record)
    }

    /// Corrected sentences, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `WritingServiceError::Progress` if the history cannot be read.
    pub async fn history(&self) -> Result<Vec<SentenceRecord>, WritingServiceError> {
        Ok(self.progress.sentences().await?)
    }
}
