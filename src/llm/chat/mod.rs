pub mod anthropic;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::anthropic::AnthropicChatClient;
use crate::models::chat::Turn;

/// Body of a single completion call.
#[derive(Serialize, Debug, Clone)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Turn>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("API key not configured. Please set CLAUDE_API_KEY environment variable.")]
    MissingApiKey,
    #[error("Invalid API key format: {0}")]
    InvalidApiKey(String),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends one request and returns the provider's JSON as-is.
    async fn create_message(
        &self,
        request: &MessagesRequest
    ) -> Result<JsonValue, ProviderError>;

    fn get_model(&self) -> String;
    fn get_max_tokens(&self) -> u32;

    fn build_request(&self, messages: Vec<Turn>) -> MessagesRequest {
        MessagesRequest {
            model: self.get_model(),
            max_tokens: self.get_max_tokens(),
            messages,
        }
    }
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ClientBuildError> {
    let client = AnthropicChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
