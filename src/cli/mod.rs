use clap::{ Args as ClapArgs, Parser, Subcommand };

use crate::client::api::DEFAULT_RELAY_URL;
use crate::llm::{ probe::DEFAULT_PROBE_MODELS, LlmConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay endpoint (POST /api/chat).
    Serve {
        /// Host address and port for the relay to listen on.
        #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3001")]
        addr: String,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Chat in the terminal through a running relay.
    Chat {
        /// Full URL of the relay chat endpoint.
        #[arg(long, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
        relay_url: String,
    },

    /// Check the configured API key against a list of models.
    Probe {
        /// Models to try, in order.
        #[arg(long, env = "PROBE_MODELS", value_delimiter = ',', default_values_t = default_probe_models())]
        models: Vec<String>,

        #[command(flatten)]
        provider: ProviderArgs,
    },
}

fn default_probe_models() -> Vec<String> {
    DEFAULT_PROBE_MODELS.iter().map(|m| m.to_string()).collect()
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ProviderArgs {
    /// API key for the provider. The relay answers 500 on every chat request while it is unset.
    #[arg(long, env = "CLAUDE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name sent with every completion request.
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Upper bound on output tokens per reply.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Base URL for the provider API (e.g., https://api.anthropic.com)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, the client falls back to the public endpoint
    pub base_url: Option<String>,
}

impl ProviderArgs {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            completion_model: self.model.clone(),
            max_tokens: self.max_tokens,
            base_url: self.base_url.clone(),
        }
    }
}
