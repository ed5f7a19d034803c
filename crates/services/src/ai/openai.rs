use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use coach_core::model::{Turn, VocabularyItem};

use super::gateway::{AiGateway, AiProvider, GatewayError, GatewayErrorKind, GrammarCorrection};
use super::prompt;
use crate::config::ProviderConfig;

const CHAT_TEMPERATURE: f32 = 0.7;
const VOCABULARY_TEMPERATURE: f32 = 0.3;
const GRAMMAR_TEMPERATURE: f32 = 0.3;

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiGateway {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.as_str().trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
        };

        debug!(model = %self.config.model, messages = payload.messages.len(), "openai request");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(status, &body));
        }

        let body: ChatResponse = response.json().await?;
        first_content(body)
    }
}

#[async_trait]
impl AiGateway for OpenAiGateway {
    fn provider(&self) -> AiProvider {
        AiProvider::OpenAi
    }

    async fn chat(
        &self,
        system: &str,
        history: &[Turn],
        message: &str,
    ) -> Result<String, GatewayError> {
        self.complete(chat_messages(system, history, message), CHAT_TEMPERATURE)
            .await
    }

    async fn vocabulary_list(
        &self,
        level: &str,
        count: usize,
    ) -> Result<Vec<VocabularyItem>, GatewayError> {
        let messages = vec![ChatMessage {
            role: "user",
            content: prompt::vocabulary_prompt(level, count),
        }];
        let text = self.complete(messages, VOCABULARY_TEMPERATURE).await?;
        prompt::parse_vocabulary(&text)
    }

    async fn correct_grammar(&self, text: &str) -> Result<GrammarCorrection, GatewayError> {
        let messages = chat_messages(
            &prompt::grammar_system_prompt(),
            &[],
            &prompt::grammar_prompt(text),
        );
        let reply = self.complete(messages, GRAMMAR_TEMPERATURE).await?;
        prompt::parse_correction(&reply)
    }
}

fn chat_messages(system: &str, history: &[Turn], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage {
        role: "system",
        content: system.to_string(),
    });
    messages.extend(history.iter().map(|turn| ChatMessage {
        role: turn.role.as_str(),
        content: turn.content.clone(),
    }));
    messages.push(ChatMessage {
        role: "user",
        content: message.to_string(),
    });
    messages
}

fn first_content(body: ChatResponse) -> Result<String, GatewayError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    if content.is_empty() {
        return Err(GatewayError::new(
            GatewayErrorKind::EmptyResponse,
            "chat completion contained no text",
        ));
    }
    Ok(content)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
