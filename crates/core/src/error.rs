use thiserror::Error;

use crate::level_test::LevelTestError;
use crate::model::{ConversationError, QuestionError, ReviewError, VocabularyError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    LevelTest(#[from] LevelTestError),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CefrLevel, RecallQuality};

    #[test]
    fn domain_errors_convert_and_keep_messages() {
        let err: Error = RecallQuality::new(7).unwrap_err().into();
        assert!(matches!(err, Error::Review(ReviewError::InvalidQuality(7))));

        let err: Error = LevelTestError::EmptyBank {
            level: CefrLevel::B2,
        }
        .into();
        assert_eq!(err.to_string(), "no questions available for level B2");
    }
}
