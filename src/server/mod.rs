pub mod api;

use crate::llm::chat::{ new_client, ChatClient };
use crate::llm::LlmConfig;
use log::{ info, warn };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use self::api::AppState;

pub struct Server {
    addr: SocketAddr,
    chat_client: Option<Arc<dyn ChatClient>>,
}

impl Server {
    pub fn new(addr: SocketAddr, llm_config: &LlmConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_client = if llm_config.api_key().is_some() {
            info!("API Key: Found");
            Some(new_client(llm_config)?)
        } else {
            warn!("API Key: Not found. Chat requests will fail until CLAUDE_API_KEY is set.");
            None
        };

        Ok(Self { addr, chat_client })
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = AppState {
            chat_client: self.chat_client.clone(),
        };
        api::start_http_server(self.addr, state).await
    }
}
