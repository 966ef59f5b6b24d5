use log::{ info, warn };

use super::chat::{ new_client, ChatClient, ClientBuildError, ProviderError };
use super::LlmConfig;
use crate::models::chat::{ ChatResponse, Turn };

pub const PROBE_PROMPT: &str = "Say hello";
pub const PROBE_MAX_TOKENS: u32 = 50;

pub const DEFAULT_PROBE_MODELS: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-5-sonnet-20240620",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
    "claude-3-opus-20240229",
];

/// Sends the probe prompt to one model and returns the reply text.
pub async fn probe_model(client: &dyn ChatClient) -> Result<String, ProviderError> {
    let mut request = client.build_request(vec![Turn::user(PROBE_PROMPT)]);
    request.max_tokens = PROBE_MAX_TOKENS;
    let value = client.create_message(&request).await?;
    let response: ChatResponse = serde_json::from_value(value)?;
    Ok(response.first_text().to_string())
}

/// Tries each model in order and returns the first one that answers.
pub async fn find_working_model(
    config: &LlmConfig,
    models: &[String]
) -> Result<Option<String>, ClientBuildError> {
    info!("=== Testing provider API key ===");
    for model in models {
        let client = new_client(&config.with_model(model))?;
        info!("Testing model: {}", model);
        match probe_model(client.as_ref()).await {
            Ok(text) => {
                info!("Success! Response: {}", text);
                info!("Working model found: {}", model);
                return Ok(Some(model.clone()));
            }
            Err(e) => warn!("Failed: {}", e),
        }
    }
    warn!("No working model found among {} candidates", models.len());
    Ok(None)
}
