#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod config;
pub mod conversation_service;
pub mod conversation_store;
pub mod error;
pub mod keys;
pub mod level_test_service;
pub mod progress_service;
pub mod review_service;
pub mod vocabulary;
pub mod writing_service;

pub use coach_core::Clock;

pub use ai::{AiGateway, AiProvider, GatewayError, GatewayErrorKind, GrammarCorrection};
pub use app_services::AppServices;
pub use config::{AppConfig, ProviderConfig};
pub use conversation_service::ConversationService;
pub use conversation_store::ConversationSessionStore;
pub use error::{
    AppServicesError, ConfigError, ConversationServiceError, LevelTestServiceError, ProgressError,
    ReviewServiceError, VocabularyServiceError, WritingServiceError,
};
pub use level_test_service::LevelTestService;
pub use progress_service::ProgressService;
pub use review_service::ReviewService;
pub use vocabulary::{
    VocabularyFallbackProvider, VocabularyList, VocabularyService, VocabularySource,
};
pub use writing_service::WritingService;
