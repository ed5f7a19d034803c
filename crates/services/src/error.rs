//! Shared error types for the services crate.

use thiserror::Error;

use coach_core::level_test::LevelTestError;
use coach_core::model::{ConversationError, VocabularyError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::ai::GatewayError;

/// Errors emitted by `ConversationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversationServiceError {
    #[error("conversation is not configured: no AI provider available")]
    Disabled,
    #[error(transparent)]
    Conversation(#[from] ConversationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `VocabularyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VocabularyServiceError {
    #[error("invalid or missing level")]
    MissingLevel,
}

/// Errors emitted by `ReviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReviewServiceError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LevelTestService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LevelTestServiceError {
    #[error(transparent)]
    LevelTest(#[from] LevelTestError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("sentence cannot be empty")]
    EmptySentence,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `WritingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WritingServiceError {
    #[error("writing correction is not configured: no AI provider available")]
    Disabled,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown AI_PROVIDER value: {0}")]
    UnknownProvider(String),
    #[error("invalid {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid {var}: {raw}")]
    InvalidNumber { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    LevelTest(#[from] LevelTestError),
}
