//! Hosted chat-model collaborator.
//!
//! # Responsibility
//! - Describe the chat-completion call the generation service depends on.
//! - Provide the Azure OpenAI HTTP client used in deployments.
//!
//! # Invariants
//! - Clients are stateless between calls; one call is one HTTP round trip.
//! - Request timeouts belong to client configuration, not to callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod azure;

pub use azure::AzureOpenAiClient;

/// Speaker of one chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation client configuration: {0}")]
    Config(String),
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no completion content")]
    EmptyCompletion,
}

/// Chat-completion endpoint of a hosted model.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Sends the ordered turns and returns the first completion's text.
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, ChatRole};
    use serde_json::json;

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let turns = [
            ChatMessage::assistant("earlier"),
            ChatMessage::user("next"),
        ];
        assert_eq!(
            serde_json::to_value(&turns).unwrap(),
            json!([
                { "role": "assistant", "content": "earlier" },
                { "role": "user", "content": "next" }
            ])
        );
        assert!(serde_json::from_value::<ChatRole>(json!("system")).is_err());
    }
}
