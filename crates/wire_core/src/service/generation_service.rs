//! Text generation use-case service.
//!
//! # Invariants
//! - Failures never escape as errors: every failed or empty generation is
//!   logged and returned as `None`.
//! - Prompt text is logged only as a sanitized, length-capped excerpt.

use crate::generation::{ChatCompletionClient, ChatMessage};
use crate::logging::sanitize_message;
use log::{error, info, warn};

const MAX_PROMPT_LOG_CHARS: usize = 80;

/// Stateless pass-through to a hosted chat model.
pub struct TextGenerationService<C: ChatCompletionClient> {
    client: C,
}

impl<C: ChatCompletionClient> TextGenerationService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Generates text for `prompt`, optionally continuing from `context`.
    ///
    /// `None` means generation failed; it never means "empty answer".
    pub async fn generate_text(&self, prompt: &str, context: Option<&str>) -> Option<String> {
        let messages = build_messages(prompt, context);

        match self.client.complete_chat(&messages).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    "event=text_generate module=service status=ok turns={} output_chars={}",
                    messages.len(),
                    text.chars().count()
                );
                Some(text)
            }
            Ok(_) => {
                warn!(
                    "event=text_generate module=service status=empty turns={} prompt={}",
                    messages.len(),
                    sanitize_message(prompt, MAX_PROMPT_LOG_CHARS)
                );
                None
            }
            Err(err) => {
                error!(
                    "event=text_generate module=service status=error turns={} prompt={} error={}",
                    messages.len(),
                    sanitize_message(prompt, MAX_PROMPT_LOG_CHARS),
                    err
                );
                None
            }
        }
    }
}

/// Prior assistant context (when given) followed by the user prompt.
fn build_messages(prompt: &str, context: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(context) = context.filter(|context| !context.trim().is_empty()) {
        messages.push(ChatMessage::assistant(context));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}
