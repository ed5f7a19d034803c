use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use coach_core::model::{Turn, VocabularyItem};

/// Which vendor answers chat and vocabulary requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayErrorKind {
    NotConfigured,
    Unauthorized,
    RateLimited,
    Upstream(u16),
    EmptyResponse,
    InvalidResponse,
    Network,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayErrorKind::NotConfigured => f.write_str("not configured"),
            GatewayErrorKind::Unauthorized => f.write_str("unauthorized"),
            GatewayErrorKind::RateLimited => f.write_str("rate limited"),
            GatewayErrorKind::Upstream(status) => write!(f, "upstream status {status}"),
            GatewayErrorKind::EmptyResponse => f.write_str("empty response"),
            GatewayErrorKind::InvalidResponse => f.write_str("invalid response"),
            GatewayErrorKind::Network => f.write_str("network error"),
        }
    }
}

/// A failed vendor call, tagged with a kind the caller can branch on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    #[must_use]
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = match status.as_u16() {
            401 | 403 => GatewayErrorKind::Unauthorized,
            429 => GatewayErrorKind::RateLimited,
            other => GatewayErrorKind::Upstream(other),
        };
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        };
        Self::new(kind, message)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            GatewayErrorKind::InvalidResponse
        } else {
            GatewayErrorKind::Network
        };
        Self::new(kind, err.to_string())
    }
}

/// A vendor's correction of a piece of learner writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarCorrection {
    pub corrected: String,
    pub feedback: String,
}

//
// ─── GATEWAY ───────────────────────────────────────────────────────────────────
//

/// Outbound port to a language-model vendor.
///
/// Implementations make exactly one request per call; retries are the
/// caller's decision.
#[async_trait]
pub trait AiGateway: Send + Sync {
    fn provider(&self) -> AiProvider;

    /// Continue a dialogue: `history` holds earlier turns, `message` is the
    /// new user input.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the vendor call fails or yields no text.
    async fn chat(
        &self,
        system: &str,
        history: &[Turn],
        message: &str,
    ) -> Result<String, GatewayError>;

    /// Generate `count` words suitable for `level`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the vendor call fails or the payload is not a
    /// non-empty vocabulary array.
    async fn vocabulary_list(
        &self,
        level: &str,
        count: usize,
    ) -> Result<Vec<VocabularyItem>, GatewayError>;

    /// Correct the grammar of `text` and explain the changes.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the vendor call fails or the payload has no
    /// corrected text.
    async fn correct_grammar(&self, text: &str) -> Result<GrammarCorrection, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(
            GatewayError::from_status(StatusCode::UNAUTHORIZED, "").kind,
            GatewayErrorKind::Unauthorized
        );
        assert_eq!(
            GatewayError::from_status(StatusCode::FORBIDDEN, "").kind,
            GatewayErrorKind::Unauthorized
        );
        assert_eq!(
            GatewayError::from_status(StatusCode::TOO_MANY_REQUESTS, "").kind,
            GatewayErrorKind::RateLimited
        );
        assert_eq!(
            GatewayError::from_status(StatusCode::BAD_GATEWAY, "").kind,
            GatewayErrorKind::Upstream(502)
        );
    }

    #[test]
    fn status_message_prefers_body() {
        let err = GatewayError::from_status(StatusCode::NOT_FOUND, "  model not found ");
        assert_eq!(err.message, "model not found");
        assert_eq!(err.to_string(), "upstream status 404: model not found");

        let err = GatewayError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.message, "404 Not Found");
    }
}
