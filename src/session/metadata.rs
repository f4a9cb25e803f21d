//! Session and message metadata
//!
//! Free-form key/value context attached to a session on creation
//! (platform, purpose) or to a single message (request type, action tag).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata carried on session and message requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionMetadata {
    entries: Map<String, Value>,
}

impl SessionMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for opening a session: `{platform, purpose}`
    pub fn for_session(platform: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self::new()
            .with("platform", platform.into())
            .with("purpose", purpose.into())
    }

    /// Metadata for routing a message: `{requestType, action}`
    pub fn for_message(request_type: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new()
            .with("requestType", request_type.into())
            .with("action", action.into())
    }

    /// Add or replace an entry
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Get an entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a string entry
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
