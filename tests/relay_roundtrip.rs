use async_trait::async_trait;
use chat_relay::client::api::HttpRelay;
use chat_relay::client::session::{ ChatSession, SendState };
use chat_relay::llm::chat::{ ChatClient, MessagesRequest, ProviderError };
use chat_relay::models::chat::Turn;
use chat_relay::server::api::{ router, AppState, CHAT_ROUTE };
use serde_json::{ json, Value as JsonValue };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::Arc;

struct EchoProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatClient for EchoProvider {
    async fn create_message(
        &self,
        request: &MessagesRequest
    ) -> Result<JsonValue, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = request.messages.last().map(Turn::content).unwrap_or_default();
        let text = if last == "hello" { "hi there".to_string() } else { format!("echo: {}", last) };
        Ok(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }]
        }))
    }

    fn get_model(&self) -> String {
        "claude-test".into()
    }

    fn get_max_tokens(&self) -> u32 {
        1024
    }
}

async fn start_relay(chat_client: Option<Arc<dyn ChatClient>>) -> HttpRelay {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState { chat_client });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    HttpRelay::new(format!("http://{}{}", addr, CHAT_ROUTE))
}

#[tokio::test]
async fn hello_round_trip() {
    let provider = Arc::new(EchoProvider { calls: AtomicUsize::new(0) });
    let relay = start_relay(Some(provider.clone())).await;
    let mut session = ChatSession::new();

    assert!(session.send(&relay, "hello").await);
    assert!(session.send(&relay, "again").await);

    assert_eq!(
        session.conversation().turns(),
        &[
            Turn::user("hello"),
            Turn::assistant("hi there"),
            Turn::user("again"),
            Turn::assistant("echo: again"),
        ]
    );
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn missing_credential_leaves_only_the_user_turn() {
    let relay = start_relay(None).await;
    let mut session = ChatSession::new();

    session.send(&relay, "x").await;

    assert_eq!(session.conversation().turns(), &[Turn::user("x")]);
    assert_eq!(session.state(), SendState::Idle);
    let error = session.error().expect("error should be set");
    assert!(error.starts_with("API key not configured"), "got {:?}", error);
}
