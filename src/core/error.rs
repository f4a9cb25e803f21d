//! Crate error types

use std::time::Duration;

use thiserror::Error;

use crate::oracle::BatchValidationError;

/// Errors that can occur while talking to agents or publishing signals
#[derive(Error, Debug)]
pub enum SeinsightError {
    /// The agent service refused to open a session, or returned no session id
    #[error("Failed to create session for agent {agent_id}: {reason}")]
    SessionCreationFailed { agent_id: String, reason: String },

    /// The prompt could not be posted to an open session
    #[error("Failed to send message to session {session_id}: {reason}")]
    MessageSendFailed { session_id: String, reason: String },

    /// No agent reply appeared before the poll deadline
    #[error("Timed out after {waited:?} waiting for a reply in session {session_id}")]
    ReplyTimeout { session_id: String, waited: Duration },

    /// The caller cancelled the exchange while it was polling
    #[error("Exchange cancelled for session {session_id}")]
    Cancelled { session_id: String },

    /// The hashtag agent replied without any usable hashtag
    #[error("Agent reply contained no hashtags")]
    EmptyHashtags,

    /// Signal batch failed validation before submission
    #[error("Invalid signal batch: {0}")]
    InvalidBatch(#[from] BatchValidationError),

    /// Provider or contract call failed
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Publisher account cannot pay for the transaction
    #[error("Insufficient balance: {balance_wei} wei available, {required_wei} wei required")]
    InsufficientBalance { balance_wei: u128, required_wei: u128 },

    /// Transaction was mined but reverted
    #[error("Transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: String },

    /// Transaction was not mined before the receipt deadline
    #[error("Timed out waiting for receipt of {tx_hash}")]
    ReceiptTimeout { tx_hash: String },

    /// Receipt did not contain the expected event
    #[error("Transaction {tx_hash} succeeded but {event} event not found")]
    EventNotFound { tx_hash: String, event: String },

    /// Contract return data could not be decoded
    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SeinsightError {
    /// Whether retrying the whole operation could plausibly succeed.
    ///
    /// Validation failures and cancellation are final.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SeinsightError::InvalidBatch(_)
                | SeinsightError::Cancelled { .. }
                | SeinsightError::Config(_)
                | SeinsightError::InsufficientBalance { .. }
        )
    }

    /// Short, actionable text for presenting a failure to a human
    pub fn user_message(&self) -> &'static str {
        match self {
            SeinsightError::SessionCreationFailed { .. } => {
                "The analysis service is unavailable right now. Please try again shortly."
            }
            SeinsightError::MessageSendFailed { .. } => {
                "The analysis service rejected the request. Please try again."
            }
            SeinsightError::ReplyTimeout { .. } => {
                "The analysis service did not respond in time. Please try again."
            }
            SeinsightError::Cancelled { .. } => "The request was cancelled.",
            SeinsightError::EmptyHashtags => {
                "No hashtags could be generated for this description. Try adding more detail."
            }
            SeinsightError::InvalidBatch(_) => "The signal batch was invalid and was not published.",
            SeinsightError::InsufficientBalance { .. } => {
                "The publisher account does not have enough funds to publish."
            }
            SeinsightError::Rpc(_)
            | SeinsightError::TransactionReverted { .. }
            | SeinsightError::ReceiptTimeout { .. }
            | SeinsightError::EventNotFound { .. }
            | SeinsightError::AbiDecode(_) => "Publishing to the blockchain failed.",
            SeinsightError::Config(_) => "The client is misconfigured.",
            SeinsightError::Http(_) | SeinsightError::Io(_) | SeinsightError::Serialization(_) => {
                "An unexpected error occurred."
            }
        }
    }

    /// Create a configuration error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        SeinsightError::Config(msg.into())
    }
}

/// Result type alias for crate operations
pub type SeinsightResult<T> = Result<T, SeinsightError>;
