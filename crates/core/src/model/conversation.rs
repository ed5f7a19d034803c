use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ConversationId;

const PREVIEW_CHARS: usize = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversationError {
    #[error("scenario cannot be empty")]
    EmptyScenario,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("conversation belongs to scenario {found}, not {requested}")]
    ScenarioMismatch { requested: String, found: String },
}

/// Speaker of a dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message of a dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// # Errors
    ///
    /// Returns `ConversationError::EmptyMessage` if the content is blank.
    pub fn user(content: impl Into<String>) -> Result<Self, ConversationError> {
        Self::checked(Role::User, content.into())
    }

    /// # Errors
    ///
    /// Returns `ConversationError::EmptyMessage` if the content is blank.
    pub fn assistant(content: impl Into<String>) -> Result<Self, ConversationError> {
        Self::checked(Role::Assistant, content.into())
    }

    fn checked(role: Role, content: String) -> Result<Self, ConversationError> {
        if content.trim().is_empty() {
            return Err(ConversationError::EmptyMessage);
        }
        Ok(Self { role, content })
    }
}

/// A saved dialogue for one scenario.
///
/// Saving a record with an existing id supersedes the old one; records are
/// never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub scenario: String,
    pub turns: Vec<Turn>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationRecord {
    /// Starts an empty dialogue for `scenario` with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::EmptyScenario` if the scenario tag is blank.
    pub fn start(
        scenario: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ConversationError> {
        let scenario = scenario.into().trim().to_string();
        if scenario.is_empty() {
            return Err(ConversationError::EmptyScenario);
        }
        Ok(Self {
            id: ConversationId::generate(),
            scenario,
            turns: Vec::new(),
            timestamp: now,
        })
    }

    /// Appends a turn and bumps the timestamp.
    pub fn push(&mut self, turn: Turn, now: DateTime<Utc>) {
        self.turns.push(turn);
        self.timestamp = now;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// First characters of the opening message, for history listings.
    #[must_use]
    pub fn preview(&self) -> String {
        self.turns
            .first()
            .map(|turn| turn.content.chars().take(PREVIEW_CHARS).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn start_rejects_blank_scenario() {
        assert_eq!(
            ConversationRecord::start("  ", fixed_now()).unwrap_err(),
            ConversationError::EmptyScenario
        );
    }

    #[test]
    fn turns_reject_blank_content() {
        assert_eq!(Turn::user(" ").unwrap_err(), ConversationError::EmptyMessage);
        assert_eq!(Turn::assistant("hi").unwrap().role, Role::Assistant);
    }

    #[test]
    fn preview_truncates_first_turn() {
        let mut record = ConversationRecord::start("cafe", fixed_now()).unwrap();
        assert_eq!(record.preview(), "");
        let long = "Could I get a large latte with oat milk, please?";
        record.push(Turn::user(long).unwrap(), fixed_now());
        assert_eq!(record.preview().chars().count(), 30);
        assert!(long.starts_with(&record.preview()));
    }

    #[test]
    fn role_serializes_lowercase() {
        let turn = Turn::user("hello").unwrap();
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }
}
