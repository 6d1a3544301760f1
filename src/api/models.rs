//! Data models for the chat endpoint

use serde::{Deserialize, Serialize};

/// Message role in conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Student message
    User,
    /// Tutor reply
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Message content
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Request body for the chat endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Conversation identifier, stable for the lifetime of a chat
    pub id: String,
    /// Full conversation so far, ending with the new user message
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Create a request for a conversation
    pub fn new(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self { id: id.into(), messages }
    }
}

/// Events decoded from the chat data stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A chunk of assistant text
    TextDelta {
        /// Text chunk
        text: String,
    },
    /// The backend reported an error mid-stream
    Error {
        /// Error message
        message: String,
    },
    /// A step or the whole message finished
    Finish {
        /// Finish reason when the backend supplied one
        reason: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_roles_lowercase() {
        let request = ChatRequest::new("chat-1", vec![Message::user("اشرح \"الدرس\"")]);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains(r#""id":"chat-1""#));
    }
}
