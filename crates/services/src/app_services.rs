use std::sync::Arc;
use std::time::Duration;

use coach_core::level_test::QuestionBank;
use storage::repository::Storage;

use crate::Clock;
use crate::ai::AiGateway;
use crate::config::AppConfig;
use crate::conversation_service::ConversationService;
use crate::conversation_store::ConversationSessionStore;
use crate::error::AppServicesError;
use crate::level_test_service::LevelTestService;
use crate::progress_service::ProgressService;
use crate::review_service::ReviewService;
use crate::vocabulary::VocabularyService;
use crate::writing_service::WritingService;

/// Assembles app-facing services over one storage backend and gateway.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    bank: Arc<QuestionBank>,
    pacing: Duration,
    vocabulary: Arc<VocabularyService>,
    reviews: Arc<ReviewService>,
    conversations: Arc<ConversationService>,
    progress: Arc<ProgressService>,
    writing: Arc<WritingService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// built-in question bank is malformed.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Self::from_parts(storage, config.gateway(), clock, config.pacing)
    }

    /// Build services over in-memory storage with no gateway and no pacing.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::LevelTest` if the built-in question bank is malformed.
    pub fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_parts(Storage::in_memory(), None, clock, Duration::ZERO)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::LevelTest` if the built-in question bank is malformed.
    pub fn from_parts(
        storage: Storage,
        gateway: Option<Arc<dyn AiGateway>>,
        clock: Clock,
        pacing: Duration,
    ) -> Result<Self, AppServicesError> {
        let bank = Arc::new(QuestionBank::builtin()?);
        let kv = Arc::clone(&storage.kv);

        let vocabulary = Arc::new(VocabularyService::new(gateway.clone()));
        let reviews = Arc::new(ReviewService::new(clock, Arc::clone(&kv)));
        let conversations = Arc::new(ConversationService::new(
            clock,
            gateway.clone(),
            ConversationSessionStore::new(Arc::clone(&kv)),
        ));
        let progress = Arc::new(ProgressService::new(clock, kv));
        let writing = Arc::new(WritingService::new(gateway, Arc::clone(&progress)));

        Ok(Self {
            clock,
            storage,
            bank,
            pacing,
            vocabulary,
            reviews,
            conversations,
            progress,
            writing,
        })
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// A fresh level-test run; each run owns its own controller state.
    #[must_use]
    pub fn level_test(&self) -> LevelTestService {
        LevelTestService::new(Arc::clone(&self.bank), Arc::clone(&self.storage.kv), self.clock)
            .with_pacing(self.pacing)
    }

    #[must_use]
    pub fn vocabulary(&self) -> Arc<VocabularyService> {
        Arc::clone(&self.vocabulary)
    }

    #[must_use]
    pub fn reviews(&self) -> Arc<ReviewService> {
        Arc::clone(&self.reviews)
    }

    #[must_use]
    pub fn conversations(&self) -> Arc<ConversationService> {
        Arc::clone(&self.conversations)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn writing(&self) -> Arc<WritingService> {
        Arc::clone(&self.writing)
    }
}
