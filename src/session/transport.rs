//! Session transport
//!
//! `SessionTransport` is the seam between the polling client and the agent
//! service. `HttpSessionTransport` is the reqwest implementation; tests plug
//! in scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::core::SeinsightResult;

use super::types::{
    CreateSessionRequest, CreateSessionResponse, MessageList, SendMessageRequest, SessionMessage,
};

/// Default per-request timeout for session API calls
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure of a single transport call
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Create-session response carried no usable id
    #[error("response did not contain a session id")]
    MissingSessionId,

    /// Request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The four operations of the agent session API
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// `POST /sessions`, returning the issued session id
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<String, TransportError>;

    /// `POST /sessions/{id}/messages`
    async fn send_message(
        &self,
        session_id: &str,
        request: &SendMessageRequest,
    ) -> Result<(), TransportError>;

    /// `GET /sessions/{id}/messages`
    async fn list_messages(&self, session_id: &str) -> Result<Vec<SessionMessage>, TransportError>;

    /// `DELETE /sessions/{id}`
    async fn end_session(&self, session_id: &str) -> Result<(), TransportError>;
}

/// HTTP transport for the agent session API
#[derive(Debug, Clone)]
pub struct HttpSessionTransport {
    client: Client,
    base_url: String,
}

impl HttpSessionTransport {
    /// Create a transport rooted at `base_url` (e.g. `http://localhost:3000/api/messaging`)
    pub fn new(base_url: impl Into<String>) -> SeinsightResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> SeinsightResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/sessions/{}", self.base_url, session_id)
    }

    fn messages_url(&self, session_id: &str) -> String {
        format!("{}/sessions/{}/messages", self.base_url, session_id)
    }

    /// Turn a non-2xx response into `TransportError::Status`
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }
}

fn status_error(status: StatusCode, body: String) -> TransportError {
    TransportError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl SessionTransport for HttpSessionTransport {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<String, TransportError> {
        tracing::debug!("[SessionTransport] POST {}", self.sessions_url());

        let response = self
            .client
            .post(self.sessions_url())
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        let body: CreateSessionResponse = serde_json::from_str(&text)?;

        match body.session_id {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(TransportError::MissingSessionId),
        }
    }

    async fn send_message(
        &self,
        session_id: &str,
        request: &SendMessageRequest,
    ) -> Result<(), TransportError> {
        tracing::debug!("[SessionTransport] POST {}", self.messages_url(session_id));

        let response = self
            .client
            .post(self.messages_url(session_id))
            .json(request)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<SessionMessage>, TransportError> {
        let response = self.client.get(self.messages_url(session_id)).send().await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        let list: MessageList = serde_json::from_str(&text)?;
        Ok(list.into_messages())
    }

    async fn end_session(&self, session_id: &str) -> Result<(), TransportError> {
        tracing::debug!("[SessionTransport] DELETE {}", self.session_url(session_id));

        let response = self.client.delete(self.session_url(session_id)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
