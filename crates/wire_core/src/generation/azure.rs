//! Azure OpenAI chat-completions client.

use super::{ChatCompletionClient, ChatMessage, GenerationError};
use crate::config::GenerationSettings;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for one Azure OpenAI chat deployment.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    http: Client,
    completions_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl AzureOpenAiClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        if settings.endpoint.trim().is_empty() || settings.api_key.trim().is_empty() {
            return Err(GenerationError::Config(
                "endpoint and api key must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let completions_url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            settings.endpoint.trim_end_matches('/'),
            settings.deployment,
            settings.api_version
        );

        Ok(Self {
            http,
            completions_url,
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChatCompletionClient for AzureOpenAiClient {
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        debug!(
            "event=chat_request module=generation status=start turns={}",
            messages.len()
        );

        let response = self
            .http
            .post(&self.completions_url)
            .header("api-key", &self.api_key)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}
