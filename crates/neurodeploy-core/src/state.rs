//! UI-agnostic assistant state
//!
//! The transcript and the idle / awaiting-reply state machine live here so any
//! front end can drive them. At most one request is in flight; a send while
//! awaiting is dropped, not queued.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::assistant::{AssistantClient, ERROR_REPLY};

pub const WELCOME_MESSAGE: &str = "Hello! I can explain the generated scripts or help you troubleshoot your 4060 Ti setup. What would you like to know?";

/// A chat message in the assistant conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct AssistantPanel {
    pub open: bool,
    pub input: String,
    pub cursor: usize,
    transcript: Vec<ChatMessage>,
    pending: Option<oneshot::Receiver<String>>,
}

impl Default for AssistantPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantPanel {
    pub fn new() -> Self {
        Self {
            open: false,
            input: String::new(),
            cursor: 0,
            transcript: vec![ChatMessage::new(ChatRole::Assistant, WELCOME_MESSAGE)],
            pending: None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    /// Send the current input. Returns false when the send was ignored
    /// (blank input, or a reply is still outstanding).
    ///
    /// Must be called from within a tokio runtime.
    pub fn send(&mut self, client: &AssistantClient, context: &str) -> bool {
        if self.input.trim().is_empty() || self.pending.is_some() {
            debug!("ignoring send: blank input or request in flight");
            return false;
        }

        let question = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.transcript.push(ChatMessage::new(ChatRole::User, question.clone()));
        info!(chars = question.chars().count(), "sending question to assistant");

        let (tx, rx) = oneshot::channel();
        let client = client.clone();
        let context = context.to_string();
        tokio::spawn(async move {
            let reply = client.ask(&question, &context).await;
            // The panel may be gone by now; nothing to deliver to.
            let _ = tx.send(reply);
        });
        self.pending = Some(rx);
        true
    }

    /// Non-blocking check for a finished reply. Returns true if one was appended.
    pub fn poll_reply(&mut self) -> bool {
        let Some(rx) = self.pending.as_mut() else {
            return false;
        };
        let reply = match rx.try_recv() {
            Ok(text) => text,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => {
                error!("assistant task ended without a reply");
                ERROR_REPLY.to_string()
            }
        };
        self.pending = None;
        self.push_reply(reply);
        true
    }

    /// Wait for the outstanding reply, if any
    pub async fn wait_reply(&mut self) -> bool {
        let Some(rx) = self.pending.take() else {
            return false;
        };
        let reply = rx.await.unwrap_or_else(|_| {
            error!("assistant task ended without a reply");
            ERROR_REPLY.to_string()
        });
        self.push_reply(reply);
        true
    }

    fn push_reply(&mut self, text: String) {
        self.transcript.push(ChatMessage::new(ChatRole::Assistant, text));
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        let char_count = self.input.chars().count();
        if self.cursor < char_count {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_with_input(text: &str) -> AssistantPanel {
        let mut panel = AssistantPanel::new();
        for c in text.chars() {
            panel.insert_char(c);
        }
        panel
    }

    #[test]
    fn transcript_starts_with_welcome() {
        let panel = AssistantPanel::new();
        assert_eq!(panel.transcript().len(), 1);
        assert_eq!(panel.transcript()[0].role, ChatRole::Assistant);
        assert_eq!(panel.transcript()[0].text, WELCOME_MESSAGE);
        assert!(!panel.is_awaiting());
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let client = AssistantClient::new(None);
        for input in ["", "   ", "\t \n"] {
            let mut panel = panel_with_input(input);
            assert!(!panel.send(&client, "ctx"));
            assert_eq!(panel.transcript().len(), 1);
            assert!(!panel.is_awaiting());
        }
    }

    #[tokio::test]
    async fn send_appends_user_message_and_clears_input() {
        let client = AssistantClient::new(None);
        let mut panel = panel_with_input("Why Tornado 6.1?");

        assert!(panel.send(&client, "ctx"));

        assert!(panel.is_awaiting());
        assert!(panel.input.is_empty());
        assert_eq!(panel.cursor, 0);
        let last = panel.transcript().last().unwrap();
        assert_eq!(last.role, ChatRole::User);
        assert_eq!(last.text, "Why Tornado 6.1?");

        assert!(panel.wait_reply().await);
        assert!(!panel.is_awaiting());
        let reply = panel.transcript().last().unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.text, ERROR_REPLY);
        assert_eq!(panel.transcript().len(), 3);
    }

    #[tokio::test]
    async fn second_send_while_awaiting_is_dropped() {
        let client = AssistantClient::new(None);
        let mut panel = panel_with_input("first");
        assert!(panel.send(&client, "ctx"));

        for c in "second".chars() {
            panel.insert_char(c);
        }
        assert!(!panel.send(&client, "ctx"));

        // Input is kept so the user can resend once the reply lands
        assert_eq!(panel.input, "second");
        let user_messages = panel
            .transcript()
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .count();
        assert_eq!(user_messages, 1);

        assert!(panel.wait_reply().await);
        assert!(!panel.wait_reply().await);
        assert_eq!(panel.transcript().len(), 3);
    }

    #[tokio::test]
    async fn poll_reply_appends_once_finished() {
        let client = AssistantClient::new(None);
        let mut panel = panel_with_input("hello");
        panel.send(&client, "ctx");

        while !panel.poll_reply() {
            tokio::task::yield_now().await;
        }
        assert!(!panel.is_awaiting());
        assert_eq!(panel.transcript().last().unwrap().text, ERROR_REPLY);
        assert!(!panel.poll_reply());
    }

    #[tokio::test]
    async fn closing_the_panel_does_not_drop_the_reply() {
        let client = AssistantClient::new(None);
        let mut panel = panel_with_input("hello");
        panel.open = true;
        panel.send(&client, "ctx");
        panel.toggle_open();
        assert!(!panel.open);

        assert!(panel.wait_reply().await);
        assert_eq!(panel.transcript().len(), 3);
    }

    #[test]
    fn message_ids_are_unique() {
        let a = ChatMessage::new(ChatRole::User, "a");
        let b = ChatMessage::new(ChatRole::User, "a");
        assert_ne!(a.id, b.id);
        assert!(a.timestamp > 0);
    }

    #[test]
    fn editing_is_utf8_safe() {
        let mut panel = panel_with_input("añb");
        panel.cursor_left();
        panel.backspace();
        assert_eq!(panel.input, "ab");
        panel.cursor_home();
        panel.delete();
        assert_eq!(panel.input, "b");
        panel.cursor_end();
        panel.insert_char('é');
        assert_eq!(panel.input, "bé");
        assert_eq!(panel.cursor, 2);
        panel.cursor_right();
        assert_eq!(panel.cursor, 2);
    }
}
