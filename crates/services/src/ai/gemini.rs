use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use coach_core::model::{Role, Turn, VocabularyItem};

use super::gateway::{AiGateway, AiProvider, GatewayError, GatewayErrorKind, GrammarCorrection};
use super::prompt;
use crate::config::ProviderConfig;

const CHAT_TEMPERATURE: f32 = 0.7;
const VOCABULARY_TEMPERATURE: f32 = 0.3;
const GRAMMAR_TEMPERATURE: f32 = 0.3;

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    config: ProviderConfig,
}

impl GeminiGateway {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.as_str().trim_end_matches('/'),
            self.config.model
        );

        debug!(model = %self.config.model, contents = request.contents.len(), "gemini request");
        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(status, &body));
        }

        let body: GenerateResponse = response.json().await?;
        candidate_text(body)
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    fn provider(&self) -> AiProvider {
        AiProvider::Gemini
    }

    async fn chat(
        &self,
        system: &str,
        history: &[Turn],
        message: &str,
    ) -> Result<String, GatewayError> {
        let request = GenerateRequest {
            contents: contents(history, message),
            system_instruction: Some(system_instruction(system)),
            generation_config: GenerationConfig {
                temperature: CHAT_TEMPERATURE,
            },
        };
        self.generate(request).await
    }

    async fn vocabulary_list(
        &self,
        level: &str,
        count: usize,
    ) -> Result<Vec<VocabularyItem>, GatewayError> {
        let request = GenerateRequest {
            contents: contents(&[], &prompt::vocabulary_prompt(level, count)),
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: VOCABULARY_TEMPERATURE,
            },
        };
        let text = self.generate(request).await?;
        prompt::parse_vocabulary(&text)
    }

    async fn correct_grammar(&self, text: &str) -> Result<GrammarCorrection, GatewayError> {
        let request = GenerateRequest {
            contents: contents(&[], &prompt::grammar_prompt(text)),
            system_instruction: Some(system_instruction(&prompt::grammar_system_prompt())),
            generation_config: GenerationConfig {
                temperature: GRAMMAR_TEMPERATURE,
            },
        };
        let reply = self.generate(request).await?;
        prompt::parse_correction(&reply)
    }
}

fn system_instruction(text: &str) -> Content {
    Content {
        role: None,
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

/// Gemini calls the assistant side `model`.
fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn contents(history: &[Turn], message: &str) -> Vec<Content> {
    history
        .iter()
        .map(|turn| Content {
            role: Some(gemini_role(turn.role)),
            parts: vec![Part {
                text: turn.content.clone(),
            }],
        })
        .chain(std::iter::once(Content {
            role: Some("user"),
            parts: vec![Part {
                text: message.to_string(),
            }],
        }))
        .collect()
}

fn candidate_text(body: GenerateResponse) -> Result<String, GatewayError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(GatewayError::new(
            GatewayErrorKind::EmptyResponse,
            "gemini returned no candidate text",
        ));
    }
    Ok(text.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_turns_become_model_turns() {
        let history = vec![
            Turn::user("Where is gate 12?").unwrap(),
            Turn::assistant("Go straight ahead.").unwrap(),
        ];
        let roles: Vec<_> = contents(&history, "Thanks")
            .iter()
            .map(|c| c.role)
            .collect();
        assert_eq!(roles, vec![Some("user"), Some("model"), Some("user")]);
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let request = GenerateRequest {
            contents: contents(&[], "hi"),
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part { text: "sys".into() }],
            }),
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
        assert_eq!(value["contents"][0]["role"], "user");
    }

    #[test]
    fn candidate_parts_are_joined() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":" there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(candidate_text(body).unwrap(), "Hello there");
    }

    #[test]
    fn missing_candidates_are_empty_response() {
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(
            candidate_text(body).unwrap_err().kind,
            GatewayErrorKind::EmptyResponse
        );
    }
}
