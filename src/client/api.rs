use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;

use super::{ ClientError, Relay };
use crate::models::chat::{ ChatResponse, ErrorBody, RelayRequest, Turn };

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001/api/chat";

/// Talks to the relay endpoint over HTTP.
pub struct HttpRelay {
    http: HttpClient,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn send_message(&self, messages: &[Turn]) -> Result<String, ClientError> {
        let payload = RelayRequest { messages: messages.to_vec() };
        debug!("POST {} with {} messages", self.url, payload.messages.len());

        let resp = self.http.post(&self.url).json(&payload).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>().await
                .ok()
                .map(|body| body.error)
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| format!("API Error: {}", status.as_u16()));
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        let bytes = resp.bytes().await?;
        let data: ChatResponse = serde_json::from_slice(&bytes)?;
        Ok(data.first_text().to_string())
    }
}
