use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const CONVERSATION_PREFIX: &str = "conv-";
const SENTENCE_PREFIX: &str = "sent-";

/// Unique identifier for a stored conversation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Generates a fresh random id (`conv-<uuid>`).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{CONVERSATION_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a corrected-sentence record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(String);

impl SentenceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{SENTENCE_PREFIX}{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConversationId({})", self.0)
    }
}

impl fmt::Debug for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SentenceId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for ConversationId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ParseIdError {
                kind: "ConversationId".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl FromStr for SentenceId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "SentenceId".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_conversation_ids_are_prefixed_and_distinct() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert!(a.as_str().starts_with("conv-"));
        assert_ne!(a, b);
    }

    #[test]
    fn conversation_id_from_str() {
        let id: ConversationId = " conv-123 ".parse().unwrap();
        assert_eq!(id.as_str(), "conv-123");
        assert!("".parse::<ConversationId>().is_err());
        assert!("conv 1".parse::<ConversationId>().is_err());
    }

    #[test]
    fn conversation_id_serializes_as_plain_string() {
        let id: ConversationId = "conv-7".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"conv-7\"");
    }
}
