use log::{ debug, info, warn };

use super::{ ClientError, Relay };
use crate::models::chat::{ Conversation, Turn };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}

/// Conversation state for one front-end session.
///
/// A send is split into [`ChatSession::begin_send`] and
/// [`ChatSession::finish_send`] so callers can render the `Sending` state
/// while the relay call is in flight; [`ChatSession::send`] runs both.
#[derive(Debug)]
pub struct ChatSession {
    conversation: Conversation,
    state: SendState,
    error: Option<String>,
    input: String,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            state: SendState::Idle,
            error: None,
            input: String::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == SendState::Sending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Submit button state: nothing to send, or a send already running.
    pub fn can_submit(&self) -> bool {
        !self.is_sending() && !self.input.trim().is_empty()
    }

    /// Appends the pending input as a user turn and moves to `Sending`.
    ///
    /// Returns the full history to hand to the relay, or `None` when the
    /// input is blank or a send is already in flight.
    pub fn begin_send(&mut self) -> Option<Vec<Turn>> {
        if !self.can_submit() {
            return None;
        }
        let content = self.input.trim().to_string();
        self.input.clear();
        self.conversation.push(Turn::user(content));
        self.state = SendState::Sending;
        self.error = None;
        Some(self.conversation.turns().to_vec())
    }

    /// Submits one line of user input. A line arriving while a send is in
    /// flight is dropped without touching the session.
    pub fn submit(&mut self, line: impl Into<String>) -> Option<Vec<Turn>> {
        if self.is_sending() {
            debug!("Ignoring input while a reply is pending");
            return None;
        }
        self.set_input(line);
        self.begin_send()
    }

    pub fn finish_send(&mut self, result: Result<String, ClientError>) {
        match result {
            Ok(text) => {
                self.conversation.push(Turn::assistant(text));
            }
            Err(e) => {
                warn!("Send failed: {}", e);
                let message = e.to_string();
                self.error = Some(if message.is_empty() {
                    "Failed to send message".to_string()
                } else {
                    message
                });
            }
        }
        self.state = SendState::Idle;
    }

    /// Submits `input`, sends it and records the outcome. Returns `false` if
    /// nothing was sent.
    pub async fn send(&mut self, relay: &dyn Relay, input: &str) -> bool {
        let Some(messages) = self.submit(input) else {
            return false;
        };
        info!("Sending {} messages to relay", messages.len());
        let result = relay.send_message(&messages).await;
        self.finish_send(result);
        true
    }
}
