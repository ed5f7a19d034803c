use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use coach_core::model::VocabularyItem;

use super::fallback::VocabularyFallbackProvider;
use crate::ai::{AiGateway, AiProvider};
use crate::error::VocabularyServiceError;

pub const DEFAULT_WORD_COUNT: usize = 5;

/// Where a vocabulary list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularySource {
    Provider(AiProvider),
    Fallback,
}

impl fmt::Display for VocabularySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularySource::Provider(provider) => write!(f, "{provider}"),
            VocabularySource::Fallback => f.write_str("built-in list"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyList {
    pub items: Vec<VocabularyItem>,
    pub source: VocabularySource,
}

/// Vocabulary lists by CEFR level, vendor first with a built-in fallback.
#[derive(Clone)]
pub struct VocabularyService {
    gateway: Option<Arc<dyn AiGateway>>,
    fallback: VocabularyFallbackProvider,
}

impl VocabularyService {
    #[must_use]
    pub fn new(gateway: Option<Arc<dyn AiGateway>>) -> Self {
        Self {
            gateway,
            fallback: VocabularyFallbackProvider::new(),
        }
    }

    /// Words for `level`, `count` defaulting to five.
    ///
    /// Vendor failures are logged and replaced by the fallback list; the
    /// caller sees which source answered.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyServiceError::MissingLevel` if `level` is blank.
    pub async fn vocabulary_list(
        &self,
        level: &str,
        count: Option<usize>,
    ) -> Result<VocabularyList, VocabularyServiceError> {
        let level = level.trim();
        if level.is_empty() {
            return Err(VocabularyServiceError::MissingLevel);
        }
        let count = count.unwrap_or(DEFAULT_WORD_COUNT);

        let Some(gateway) = self.gateway.as_ref() else {
            debug!(level, "no AI provider configured for vocabulary, using fallback");
            return Ok(self.fallback_list(level, count));
        };

        match gateway.vocabulary_list(level, count).await {
            Ok(mut items) => {
                items.truncate(count);
                Ok(VocabularyList {
                    items,
                    source: VocabularySource::Provider(gateway.provider()),
                })
            }
            Err(err) => {
                warn!(
                    provider = %gateway.provider(),
                    level,
                    error = %err,
                    "vocabulary generation failed, using fallback data"
                );
                Ok(self.fallback_list(level, count))
            }
        }
    }

    fn fallback_list(&self, level: &str, count: usize) -> VocabularyList {
        VocabularyList {
            items: self.fallback.get(level, count),
            source: VocabularySource::Fallback,
        }
    }
}
