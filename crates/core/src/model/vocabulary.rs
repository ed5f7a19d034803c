use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabularyError {
    #[error("vocabulary word cannot be empty")]
    EmptyWord,
}

/// A single word a learner studies.
///
/// Content is immutable after creation; scheduling metadata lives in
/// [`ReviewState`](crate::model::ReviewState), keyed by [`VocabularyItem::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    word: String,
    meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ipa: Option<String>,
    example: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mnemonic: Option<String>,
}

impl VocabularyItem {
    /// Creates an item with the required fields.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::EmptyWord` if `word` is blank.
    pub fn new(
        word: impl Into<String>,
        meaning: impl Into<String>,
        example: impl Into<String>,
    ) -> Result<Self, VocabularyError> {
        let word = word.into().trim().to_string();
        if word.is_empty() {
            return Err(VocabularyError::EmptyWord);
        }
        Ok(Self {
            word,
            meaning: meaning.into().trim().to_string(),
            ipa: None,
            example: example.into().trim().to_string(),
            translation: None,
            mnemonic: None,
        })
    }

    #[must_use]
    pub fn with_ipa(mut self, ipa: impl Into<String>) -> Self {
        self.ipa = non_blank(ipa.into());
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = non_blank(translation.into());
        self
    }

    #[must_use]
    pub fn with_mnemonic(mut self, mnemonic: impl Into<String>) -> Self {
        self.mnemonic = non_blank(mnemonic.into());
        self
    }

    /// Normalized lookup key (lower-cased word).
    #[must_use]
    pub fn key(&self) -> String {
        word_key(&self.word)
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn ipa(&self) -> Option<&str> {
        self.ipa.as_deref()
    }

    #[must_use]
    pub fn example(&self) -> &str {
        &self.example
    }

    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    #[must_use]
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref()
    }
}

/// Normalizes a word into the key used for review-state lookups.
#[must_use]
pub fn word_key(word: &str) -> String {
    word.trim().to_lowercase()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_word() {
        assert_eq!(
            VocabularyItem::new("  ", "m", "e").unwrap_err(),
            VocabularyError::EmptyWord
        );
    }

    #[test]
    fn optional_fields_drop_blank_values() {
        let item = VocabularyItem::new(" Feasible ", "doable", "It is feasible.")
            .unwrap()
            .with_ipa("/ˈfiːzəbl/")
            .with_mnemonic("   ");
        assert_eq!(item.word(), "Feasible");
        assert_eq!(item.key(), "feasible");
        assert_eq!(item.ipa(), Some("/ˈfiːzəbl/"));
        assert_eq!(item.mnemonic(), None);
    }
}
