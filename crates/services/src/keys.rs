//! Keys the app owns in the key-value store.

pub const CONVERSATION_HISTORY: &str = "conversationHistory";
pub const SENTENCE_HISTORY: &str = "sentenceHistory";
pub const VOCABULARY: &str = "vocabulary";
pub const VOCABULARY_PROGRESS: &str = "vocabularyProgress";
pub const USER_LEVEL: &str = "userLevel";
pub const USER_PROGRESS: &str = "userProgress";
