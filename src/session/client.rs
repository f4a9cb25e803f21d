//! Session request/poll/cleanup client
//!
//! `SessionClient::exchange` runs one complete conversation with an agent:
//!
//! 1. open a session for the agent
//! 2. post the prompt
//! 3. poll the message list until the agent's reply appears or the deadline passes
//! 4. delete the session (always, once it was opened)
//!
//! # Example
//!
//! ```ignore
//! let client = SessionClient::http("http://localhost:3000/api/messaging")?;
//! let request = ExchangeRequest::new(agent_id, user_id, "Generate hashtags for: ...")
//!     .with_session_metadata(SessionMetadata::for_session("cli", "hashtag-generation"));
//! let reply = client.exchange(&request).await?;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::core::{SeinsightError, SeinsightResult};

use super::metadata::SessionMetadata;
use super::poll::PollPolicy;
use super::transport::{HttpSessionTransport, SessionTransport, TransportError};
use super::types::{latest_reply, CreateSessionRequest, SendMessageRequest, Session};

/// One prompt addressed to one agent
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub agent_id: String,
    pub user_id: String,
    pub prompt: String,
    pub session_metadata: Option<SessionMetadata>,
    pub message_metadata: Option<SessionMetadata>,
    /// Overrides the client's poll deadline for this exchange
    pub max_wait: Option<Duration>,
}

impl ExchangeRequest {
    pub fn new(
        agent_id: impl Into<String>,
        user_id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            user_id: user_id.into(),
            prompt: prompt.into(),
            session_metadata: None,
            message_metadata: None,
            max_wait: None,
        }
    }

    pub fn with_session_metadata(mut self, metadata: SessionMetadata) -> Self {
        self.session_metadata = Some(metadata);
        self
    }

    pub fn with_message_metadata(mut self, metadata: SessionMetadata) -> Self {
        self.message_metadata = Some(metadata);
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

/// Client for the agent session protocol
#[derive(Clone)]
pub struct SessionClient {
    transport: Arc<dyn SessionTransport>,
    poll: PollPolicy,
}

impl SessionClient {
    /// Create a client over any transport, using the default poll policy
    pub fn new(transport: Arc<dyn SessionTransport>) -> Self {
        Self {
            transport,
            poll: PollPolicy::default(),
        }
    }

    /// Create a client over HTTP rooted at `base_url`
    pub fn http(base_url: impl Into<String>) -> SeinsightResult<Self> {
        Ok(Self::new(Arc::new(HttpSessionTransport::new(base_url)?)))
    }

    /// Set the poll policy
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    /// Run one exchange and return the agent's reply text
    pub async fn exchange(&self, request: &ExchangeRequest) -> SeinsightResult<String> {
        self.exchange_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run one exchange, aborting early if `cancel` fires.
    ///
    /// The session is deleted on every path once it has been opened.
    pub async fn exchange_with_cancel(
        &self,
        request: &ExchangeRequest,
        cancel: &CancellationToken,
    ) -> SeinsightResult<String> {
        let session = self.open_session(request).await?;

        let result = self.converse(&session, request, cancel).await;

        self.close_session(&session).await;

        match &result {
            Ok(reply) => tracing::info!(
                "[SessionClient] Reply from agent {} ({} chars)",
                session.agent_id,
                reply.len()
            ),
            Err(e) => tracing::warn!("[SessionClient] Exchange with agent {} failed: {}", session.agent_id, e),
        }

        result
    }

    async fn open_session(&self, request: &ExchangeRequest) -> SeinsightResult<Session> {
        let body = CreateSessionRequest {
            agent_id: request.agent_id.clone(),
            user_id: request.user_id.clone(),
            metadata: request.session_metadata.clone(),
        };

        let session_id = self.transport.create_session(&body).await.map_err(|e| {
            tracing::error!("[SessionClient] Session creation failed for {}: {}", request.agent_id, e);
            SeinsightError::SessionCreationFailed {
                agent_id: request.agent_id.clone(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(
            "[SessionClient] Opened session {} with agent {}",
            session_id,
            request.agent_id
        );

        Ok(Session {
            session_id,
            agent_id: body.agent_id,
            user_id: body.user_id,
            metadata: body.metadata,
        })
    }

    async fn converse(
        &self,
        session: &Session,
        request: &ExchangeRequest,
        cancel: &CancellationToken,
    ) -> SeinsightResult<String> {
        let message = SendMessageRequest {
            content: request.prompt.clone(),
            metadata: request.message_metadata.clone(),
        };

        self.transport
            .send_message(&session.session_id, &message)
            .await
            .map_err(|e| SeinsightError::MessageSendFailed {
                session_id: session.session_id.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            "[SessionClient] Sent {} chars to session {}",
            request.prompt.len(),
            session.session_id
        );

        let policy = match request.max_wait {
            Some(max_wait) => self.poll.with_max_wait(max_wait),
            None => self.poll,
        };

        self.wait_for_reply(&session.session_id, &policy, cancel).await
    }

    /// Poll until a reply appears, the deadline passes, or `cancel` fires
    async fn wait_for_reply(
        &self,
        session_id: &str,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> SeinsightResult<String> {
        let started = Instant::now();
        let mut scheduled = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            let delay = policy.delay_for(attempt);
            scheduled += delay;
            if scheduled > policy.max_wait {
                break;
            }

            let polled = tokio::select! {
                _ = cancel.cancelled() => None,
                polled = async {
                    tokio::time::sleep(delay).await;
                    self.transport.list_messages(session_id).await
                } => Some(polled),
            };

            let Some(polled) = polled else {
                tracing::info!("[SessionClient] Polling cancelled for session {}", session_id);
                return Err(SeinsightError::Cancelled {
                    session_id: session_id.to_string(),
                });
            };

            attempt += 1;

            match polled {
                Ok(messages) => {
                    if let Some(reply) = latest_reply(&messages) {
                        tracing::debug!(
                            "[SessionClient] Reply found on poll #{} for session {}",
                            attempt,
                            session_id
                        );
                        return Ok(reply.content.clone());
                    }
                }
                Err(e) => {
                    // Not ready yet; keep polling until the deadline.
                    log_poll_failure(session_id, attempt, &e);
                }
            }

            if started.elapsed() >= policy.max_wait {
                break;
            }
        }

        Err(SeinsightError::ReplyTimeout {
            session_id: session_id.to_string(),
            waited: started.elapsed(),
        })
    }

    async fn close_session(&self, session: &Session) {
        match self.transport.end_session(&session.session_id).await {
            Ok(()) => tracing::debug!("[SessionClient] Deleted session {}", session.session_id),
            Err(e) => tracing::warn!(
                "[SessionClient] Failed to delete session {}: {}",
                session.session_id,
                e
            ),
        }
    }
}

fn log_poll_failure(session_id: &str, attempt: u32, error: &TransportError) {
    tracing::debug!(
        "[SessionClient] Poll #{} for session {} failed: {}",
        attempt,
        session_id,
        error
    );
}
