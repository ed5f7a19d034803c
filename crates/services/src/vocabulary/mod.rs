mod fallback;
mod service;

pub use fallback::VocabularyFallbackProvider;
pub use service::{DEFAULT_WORD_COUNT, VocabularyList, VocabularyService, VocabularySource};
