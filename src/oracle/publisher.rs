//! Signal publication pipeline
//!
//! Collected data is hashed, its three most frequent hashtags become the
//! batch signals, and the validated batch is handed to a [`SignalOracle`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::OracleConfig;
use crate::core::SeinsightResult;
use crate::helpers::{rank_hashtags, top_three_signals};
use crate::social::TwitterData;

use super::batch::{now_secs, PublishedBatch, SignalBatch};
use super::content::{hash_twitter_data, ContentDigest};
use super::contract::SignalOracle;

/// A batch ready for submission, with the inputs it was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedBatch {
    pub digest: ContentDigest,
    /// Up to three `(hashtag, count)` pairs backing the signals
    pub ranked: Vec<(String, usize)>,
    pub batch: SignalBatch,
}

/// Outcome of a successful publication
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationReport {
    pub digest: ContentDigest,
    pub ranked: Vec<(String, usize)>,
    pub published: PublishedBatch,
    pub tx_url: String,
}

/// Builds signal batches from collected data and publishes them
pub struct SignalPublisher {
    oracle: Arc<dyn SignalOracle>,
    source: String,
    window: Duration,
}

impl SignalPublisher {
    /// Publisher with a one-hour window and `twitter` source
    pub fn new(oracle: Arc<dyn SignalOracle>) -> Self {
        Self {
            oracle,
            source: "twitter".to_string(),
            window: Duration::from_secs(3600),
        }
    }

    pub fn from_config(oracle: Arc<dyn SignalOracle>, config: &OracleConfig) -> Self {
        Self::new(oracle)
            .with_source(config.source.clone())
            .with_window(config.window())
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn oracle(&self) -> &Arc<dyn SignalOracle> {
        &self.oracle
    }

    /// Hash, rank and build a validated batch whose window ends at `now`
    pub fn prepare(&self, data: &TwitterData, now: u64) -> SeinsightResult<PreparedBatch> {
        let digest = hash_twitter_data(data)?;
        let ranked: Vec<(String, usize)> = rank_hashtags(data.texts()).into_iter().take(3).collect();
        let signals = top_three_signals(data.texts());

        let batch = SignalBatch {
            window_start: now.saturating_sub(self.window.as_secs()),
            window_end: now,
            signals,
            cid: digest.cid.clone(),
            source: self.source.clone(),
        };
        batch.validate(now)?;

        Ok(PreparedBatch { digest, ranked, batch })
    }

    /// Prepare a batch for the last window and publish it
    pub async fn publish(&self, data: &TwitterData) -> SeinsightResult<PublicationReport> {
        let prepared = self.prepare(data, now_secs())?;

        tracing::info!(
            "[Publisher] Top signals: {}",
            prepared
                .ranked
                .iter()
                .map(|(tag, count)| format!("{} ({})", tag, count))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let published = self.oracle.publish(&prepared.batch).await?;
        let tx_url = self.oracle.tx_url(&published.tx_hash);

        Ok(PublicationReport {
            digest: prepared.digest,
            ranked: prepared.ranked,
            published,
            tx_url,
        })
    }
}
