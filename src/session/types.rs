//! Wire types for the agent session API

use serde::{Deserialize, Serialize};

use super::metadata::SessionMetadata;

/// Body of `POST /sessions`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub agent_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,
}

/// Response of `POST /sessions`
///
/// The id is optional on the wire so that a missing id surfaces as a
/// creation failure rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `POST /sessions/{id}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,
}

/// One turn in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_agent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SessionMessage {
    /// Message authored by the agent
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            is_agent: true,
            timestamp: None,
        }
    }

    /// Message authored by the caller
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            is_agent: false,
            timestamp: None,
        }
    }

    /// Agent-authored with non-blank content
    pub fn is_reply(&self) -> bool {
        self.is_agent && !self.content.trim().is_empty()
    }
}

/// Response of `GET /sessions/{id}/messages`
///
/// Accepts both `{"messages": [...]}` and a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageList {
    Wrapped { messages: Vec<SessionMessage> },
    Bare(Vec<SessionMessage>),
}

impl MessageList {
    pub fn into_messages(self) -> Vec<SessionMessage> {
        match self {
            MessageList::Wrapped { messages } => messages,
            MessageList::Bare(messages) => messages,
        }
    }
}

/// Pick the reply from a message list: the last agent message with
/// non-blank content, in list order.
pub fn latest_reply(messages: &[SessionMessage]) -> Option<&SessionMessage> {
    messages.iter().rev().find(|m| m.is_reply())
}

/// A session opened on the agent service
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub agent_id: String,
    pub user_id: String,
    pub metadata: Option<SessionMetadata>,
}
