pub mod models;
pub mod llm;
pub mod cli;
pub mod server;
pub mod client;

use cli::{ Args, Command };
use llm::probe::find_working_model;
use log::info;
use server::Server;
use std::error::Error;
use std::net::SocketAddr;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve { addr, provider } => {
            let addr = addr.parse::<SocketAddr>()?;
            let config = provider.llm_config();

            info!("--- Relay Configuration ---");
            info!("Server Address: {}", addr);
            info!("Chat Model: {}", config.completion_model);
            info!("Max Tokens: {}", config.max_tokens);
            info!("Provider Base URL: {}", config.base_url.as_deref().unwrap_or("adapter default"));
            info!("---------------------------");

            let server = Server::new(addr, &config)?;
            server.run().await?;
        }
        Command::Chat { relay_url } => {
            client::run_chat(&relay_url).await?;
        }
        Command::Probe { models, provider } => {
            if let Some(model) = find_working_model(&provider.llm_config(), &models).await? {
                info!("Set CHAT_MODEL={} to use it with the relay", model);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serves `app` on an ephemeral local port and returns its base URL.
    pub async fn spawn_router(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
