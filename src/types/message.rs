//! Message types
//!
//! Defines chat message structures, roles and the session transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// First message of every new chat session
pub const GREETING: &str = "Hello! I'm the INVINCIX chatbot. 👋\n\nI'm here to help you learn about our services, products, and how we can support your business transformation journey. Whether you're a startup founder or an enterprise leader, I'd love to assist you!\n\nWhat would you like to know?";

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user
    User,
    /// Message from the AI assistant
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// The role of the message sender
    pub role: Role,
    /// The content of the message
    pub content: String,
    /// When the message was added
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("refusing to add an empty {0:?} message")]
    EmptyContent(Role),
}

/// Ordered chat history for one UI session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// A transcript opened by the assistant's greeting
    pub fn with_greeting() -> Self {
        Self {
            messages: vec![Message::new(Role::Assistant, GREETING)],
        }
    }

    /// Appends a message; blank content is rejected
    pub fn push(
        &mut self,
        role: Role,
        content: impl Into<String>,
    ) -> Result<&Message, TranscriptError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(TranscriptError::EmptyContent(role));
        }
        self.messages.push(Message::new(role, content));
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Removes every message, greeting included
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::new(Role::User, "Hello, world!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, world!");
        assert_ne!(msg.id, Message::new(Role::User, "Hello, world!").id);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn test_transcript_starts_with_greeting() {
        let transcript = Transcript::with_greeting();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, Role::Assistant);
        assert!(transcript.messages()[0].content.contains("INVINCIX chatbot"));
    }

    #[test]
    fn test_transcript_keeps_order() {
        let mut transcript = Transcript::default();
        transcript.push(Role::User, "What does INVINCIX do?").unwrap();
        transcript.push(Role::Assistant, "Software engineering.").unwrap();

        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn test_transcript_rejects_empty_content() {
        let mut transcript = Transcript::default();
        assert_eq!(
            transcript.push(Role::User, "  \n").unwrap_err(),
            TranscriptError::EmptyContent(Role::User)
        );
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut transcript = Transcript::with_greeting();
        transcript.push(Role::User, "hi").unwrap();
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
