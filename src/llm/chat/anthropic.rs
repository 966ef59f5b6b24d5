use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{ ChatClient, ClientBuildError, MessagesRequest, ProviderError };
use crate::llm::{ LlmConfig, DEFAULT_BASE_URL };

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicChatClient {
    http: HttpClient,
    model: String,
    max_tokens: u32,
    base_url: String,
}

#[derive(Deserialize)]
struct AnthropicErrorEnvelope {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

impl AnthropicChatClient {
    pub fn new(
        api_key: &str,
        model: String,
        max_tokens: u32,
        base_url: Option<String>
    ) -> Result<Self, ClientBuildError> {
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| ClientBuildError::InvalidApiKey(e.to_string()))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            model,
            max_tokens,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ClientBuildError> {
        let api_key = config.api_key().ok_or(ClientBuildError::MissingApiKey)?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.max_tokens,
            config.base_url.clone(),
        )
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<AnthropicErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let body = body.trim();
    if body.is_empty() {
        format!("Provider returned status {}", status)
    } else {
        format!("{} {}", status.as_u16(), body)
    }
}

#[async_trait]
impl ChatClient for AnthropicChatClient {
    async fn create_message(
        &self,
        request: &MessagesRequest
    ) -> Result<JsonValue, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        debug!("POST {} (model={}, messages={})", url, request.model, request.messages.len());

        let resp = self.http.post(&url).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
