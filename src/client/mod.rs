pub mod api;
pub mod render;
pub mod session;

use async_trait::async_trait;
use log::info;
use std::error::Error as StdError;
use std::io::{ self, Write };
use thiserror::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, BufReader };

use crate::models::chat::Turn;
use self::api::HttpRelay;
use self::render::Renderer;
use self::session::ChatSession;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to read relay response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Front-end side of the relay: sends the full history, returns the reply text.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn send_message(&self, messages: &[Turn]) -> Result<String, ClientError>;
}

/// Interactive terminal session against the relay at `relay_url`.
pub async fn run_chat(relay_url: &str) -> Result<(), Box<dyn StdError + Send + Sync>> {
    let relay = HttpRelay::new(relay_url);
    info!("Using relay at {}", relay.url());

    let mut renderer = Renderer::new(std::io::stdout());
    let session = chat_loop(&relay, BufReader::new(tokio::io::stdin()), &mut renderer).await?;

    info!("Session ended with {} turns", session.conversation().len());
    Ok(())
}

/// Reads lines from `input` until EOF, sending each one through `relay`.
///
/// Input keeps being read while a reply is pending; those lines go through
/// [`ChatSession::submit`], which drops them.
pub async fn chat_loop<R, W>(
    relay: &dyn Relay,
    input: R,
    renderer: &mut Renderer<W>,
) -> io::Result<ChatSession>
    where R: AsyncBufRead + Unpin, W: Write
{
    let mut session = ChatSession::new();
    renderer.header()?;

    let mut lines = input.lines();
    let mut input_closed = false;
    while !input_closed {
        renderer.prompt(&session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(messages) = session.submit(line) else {
            continue;
        };
        renderer.render(&session)?;
        renderer.prompt(&session)?;

        let pending = relay.send_message(&messages);
        tokio::pin!(pending);
        let result = loop {
            tokio::select! {
                result = &mut pending => break result,
                line = lines.next_line(), if !input_closed => match line? {
                    Some(line) => {
                        if session.submit(line).is_none() {
                            renderer.notice("(still waiting for the reply, input ignored)")?;
                        }
                    }
                    None => input_closed = true,
                },
            }
        };

        renderer.end_line()?;
        session.finish_send(result);
        renderer.render(&session)?;
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    /// Answers "ok" after `delay`, recording the history length of each call.
    struct SlowRelay {
        delay: Duration,
        seen: Mutex<Vec<usize>>,
    }

    impl SlowRelay {
        fn new(delay: Duration) -> Self {
            Self { delay, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Relay for SlowRelay {
        async fn send_message(&self, messages: &[Turn]) -> Result<String, ClientError> {
            self.seen.lock().unwrap().push(messages.len());
            tokio::time::sleep(self.delay).await;
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn lines_typed_while_sending_are_dropped() {
        let relay = SlowRelay::new(Duration::from_millis(200));
        let (mut writer, reader) = tokio::io::duplex(1024);

        let typist = tokio::spawn(async move {
            writer.write_all(b"first\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            writer.write_all(b"typed while sending\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(400)).await;
            writer.write_all(b"after the reply\n").await.unwrap();
        });

        let mut renderer = Renderer::new(Vec::new());
        let session = chat_loop(&relay, BufReader::new(reader), &mut renderer).await.unwrap();
        typist.await.unwrap();

        assert_eq!(*relay.seen.lock().unwrap(), vec![1, 3]);
        assert_eq!(
            session.conversation().turns(),
            &[
                Turn::user("first"),
                Turn::assistant("ok"),
                Turn::user("after the reply"),
                Turn::assistant("ok"),
            ]
        );
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.contains("input ignored"));
        assert!(!text.contains("typed while sending"));
    }

    #[tokio::test]
    async fn eof_while_sending_still_records_the_reply() {
        let relay = SlowRelay::new(Duration::from_millis(50));
        let input: &[u8] = b"hello\n";

        let mut renderer = Renderer::new(Vec::new());
        let session = chat_loop(&relay, BufReader::new(input), &mut renderer).await.unwrap();

        assert_eq!(*relay.seen.lock().unwrap(), vec![1]);
        assert_eq!(
            session.conversation().turns(),
            &[Turn::user("hello"), Turn::assistant("ok")]
        );
        assert!(!session.is_sending());
    }

    #[tokio::test]
    async fn blank_lines_are_not_sent() {
        let relay = SlowRelay::new(Duration::ZERO);
        let input: &[u8] = b"\n   \nhi\n";

        let mut renderer = Renderer::new(Vec::new());
        let session = chat_loop(&relay, BufReader::new(input), &mut renderer).await.unwrap();

        assert_eq!(*relay.seen.lock().unwrap(), vec![1]);
        assert_eq!(session.conversation().len(), 2);
    }
}
