mod cefr;
mod conversation;
mod ids;
mod progress;
mod question;
mod review;
pub mod scenario;
mod vocabulary;

pub use cefr::{CefrLevel, ParseLevelError, Placement};
pub use conversation::{ConversationError, ConversationRecord, Role, Turn};
pub use ids::{ConversationId, ParseIdError, SentenceId};
pub use progress::{LearnerProgress, LevelResult, SentenceRecord};
pub use question::{Question, QuestionError};
pub use review::{RecallQuality, ReviewError, ReviewState};
pub use scenario::{Scenario, ScenarioCategory};
pub use vocabulary::{VocabularyError, VocabularyItem, word_key};
