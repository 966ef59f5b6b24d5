use crate::llm::chat::{ ChatClient, ProviderError };
use crate::models::chat::{ ErrorBody, Turn };
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
            CONTENT_TYPE,
        },
        HeaderValue,
        Method,
        StatusCode,
    },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::set_header::SetResponseHeaderLayer;
use log::{ info, error };

pub const CHAT_ROUTE: &str = "/api/chat";

const MESSAGES_REQUIRED: &str = "Invalid request: messages array is required";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("API key not configured. Please set CLAUDE_API_KEY environment variable.")]
    MissingApiKey,
    #[error("{0}")]
    Provider(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingApiKey | RelayError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            RelayError::Provider("Internal server error".into())
        } else {
            RelayError::Provider(message)
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// `chat_client` is `None` when the relay was started without a credential.
#[derive(Clone)]
pub struct AppState {
    pub chat_client: Option<Arc<dyn ChatClient>>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(
            CHAT_ROUTE,
            post(chat_handler).options(preflight_handler).fallback(method_not_allowed_handler)
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*")
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS")
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type")
        ))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: SocketAddr,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
        e
    })?;
    info!("Relay server running at http://{}{}", listener.local_addr()?, CHAT_ROUTE);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn parse_messages(body: &[u8]) -> Result<Vec<Turn>, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RelayError::InvalidRequest(MESSAGES_REQUIRED.into()));
    }
    let mut value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| RelayError::InvalidRequest(format!("Invalid request: malformed JSON body ({})", e)))?;

    match value.get_mut("messages").map(JsonValue::take) {
        Some(messages @ JsonValue::Array(_)) => {
            serde_json::from_value(messages)
                .map_err(|e| RelayError::InvalidRequest(format!("Invalid request: {}", e)))
        }
        _ => Err(RelayError::InvalidRequest(MESSAGES_REQUIRED.into())),
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JsonValue>, RelayError> {
    let client = match &state.chat_client {
        Some(client) => client,
        None => {
            error!("CLAUDE_API_KEY is not set");
            return Err(RelayError::MissingApiKey);
        }
    };

    let messages = parse_messages(&body)?;

    info!("Calling provider with {} messages", messages.len());
    let request = client.build_request(messages);
    let response = client.create_message(&request).await.map_err(|e| {
        error!("API Error: {}", e);
        RelayError::from(e)
    })?;
    info!("Provider response received");

    Ok(Json(response))
}

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed_handler() -> RelayError {
    RelayError::MethodNotAllowed
}
