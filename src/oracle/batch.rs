//! Signal batch record and its validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a batch is rejected before submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchValidationError {
    #[error("window start {start} must be before window end {end}")]
    InvalidWindow { start: u64, end: u64 },

    #[error("window end {end} is in the future (now {now})")]
    WindowInFuture { end: u64, now: u64 },

    #[error("signal {index} is empty")]
    EmptySignal { index: usize },

    #[error("content address is empty")]
    EmptyCid,
}

/// The five-field record written to the oracle contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBatch {
    /// Epoch seconds
    pub window_start: u64,
    /// Epoch seconds
    pub window_end: u64,
    #[serde(rename = "top3Signals")]
    pub signals: [String; 3],
    pub cid: String,
    pub source: String,
}

impl SignalBatch {
    /// Build a batch and validate it against the current time
    pub fn new(
        window_start: u64,
        window_end: u64,
        signals: [String; 3],
        cid: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, BatchValidationError> {
        let batch = Self {
            window_start,
            window_end,
            signals,
            cid: cid.into(),
            source: source.into(),
        };
        batch.validate(now_secs())?;
        Ok(batch)
    }

    /// Check the batch invariants as of `now` (epoch seconds)
    pub fn validate(&self, now: u64) -> Result<(), BatchValidationError> {
        if self.window_start >= self.window_end {
            return Err(BatchValidationError::InvalidWindow {
                start: self.window_start,
                end: self.window_end,
            });
        }
        if self.window_end > now {
            return Err(BatchValidationError::WindowInFuture {
                end: self.window_end,
                now,
            });
        }
        if let Some(index) = self.signals.iter().position(|s| s.trim().is_empty()) {
            return Err(BatchValidationError::EmptySignal { index });
        }
        if self.cid.trim().is_empty() {
            return Err(BatchValidationError::EmptyCid);
        }
        Ok(())
    }
}

/// A batch as recorded on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedBatch {
    #[serde(flatten)]
    pub batch: SignalBatch,
    pub batch_id: u64,
    pub publisher: String,
    pub published_at: u64,
    pub tx_hash: String,
    pub block_number: u64,
}

/// Current time in epoch seconds
pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
