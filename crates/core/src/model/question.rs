use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question needs at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct option index {index} is out of range for {count} options")]
    CorrectIndexOutOfRange { index: usize, count: usize },
}

/// A multiple-choice level-test question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two options
    /// are supplied, or `correct_index` does not point at an option.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                count: options.len(),
            });
        }
        Ok(Self {
            prompt,
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }
}

/// Fixture shape: `{"question": ..., "options": [...], "correctAnswerIndex": n}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    question: String,
    options: Vec<String>,
    correct_answer_index: usize,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Self::new(record.question, record.options, record.correct_answer_index)
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        Self {
            question: question.prompt,
            options: question.options,
            correct_answer_index: question.correct_index,
        }
    }
}
