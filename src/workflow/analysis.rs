//! Market analysis workflow
//!
//! Four agent exchanges run strictly in sequence, each feeding the next:
//! hashtags, Twitter collection, signal generation and critical analysis.
//! Every step is retried independently with exponential backoff.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::{SeinsightError, SeinsightResult};
use crate::helpers::{parse_hashtags, retry_with_backoff, RetryPolicy};
use crate::session::{ExchangeRequest, SessionClient, SessionMetadata};
use crate::social::TwitterSummary;

use super::prompts;

/// Agent identifiers for each workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDirectory {
    pub keywords_generator: String,
    pub twitter_collector: String,
    pub insights_compiler: String,
    pub oracle_agent: String,
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self {
            keywords_generator: "6045e764-c7b4-049a-9288-8a61c67c894c".to_string(),
            twitter_collector: "49694f6f-1a24-047d-b67f-1b3a56096764".to_string(),
            insights_compiler: "8d382733-c09f-0d62-9f6e-cdb1afd3a4d0".to_string(),
            oracle_agent: "8d382733-c09f-0d62-9f6e-cdb1afd3a4d0".to_string(),
        }
    }
}

/// Workflow stage, reported through the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStep {
    Hashtags,
    Twitter,
    Signals,
    Analysis,
}

impl ProcessingStep {
    /// `purpose` / `requestType` tag sent with the step's session
    pub fn purpose(&self) -> &'static str {
        match self {
            ProcessingStep::Hashtags => "hashtag-generation",
            ProcessingStep::Twitter => "twitter-collection",
            ProcessingStep::Signals => "signal-generation",
            ProcessingStep::Analysis => "critical-analysis",
        }
    }

    /// `action` tag sent with the step's prompt
    pub fn action(&self) -> &'static str {
        match self {
            ProcessingStep::Hashtags => "GENERATE_HASHTAGS",
            ProcessingStep::Twitter => "COLLECT_TWITTER_DATA",
            ProcessingStep::Signals => "GENERATE_TOP3_SIGNALS",
            ProcessingStep::Analysis => "PERFORM_CRITICAL_ANALYSIS",
        }
    }
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessingStep::Hashtags => "Generating hashtags",
            ProcessingStep::Twitter => "Collecting Twitter data",
            ProcessingStep::Signals => "Generating signals",
            ProcessingStep::Analysis => "Running critical analysis",
        };
        f.write_str(label)
    }
}

/// Everything one workflow run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub description: String,
    pub hashtags: Vec<String>,
    pub twitter: TwitterSummary,
    pub signals: String,
    pub analysis: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Sequential hashtag → collection → signals → analysis runner
pub struct AnalysisWorkflow {
    client: SessionClient,
    agents: AgentDirectory,
    user_id: String,
    platform: String,
    hashtag_retry: RetryPolicy,
    step_retry: RetryPolicy,
}

impl AnalysisWorkflow {
    pub fn new(client: SessionClient, agents: AgentDirectory, user_id: impl Into<String>) -> Self {
        Self {
            client,
            agents,
            user_id: user_id.into(),
            platform: "cli".to_string(),
            hashtag_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            step_retry: RetryPolicy::new(2, Duration::from_secs(1)),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Retry budgets for the hashtag step and for every later step
    pub fn with_retry_policies(mut self, hashtags: RetryPolicy, steps: RetryPolicy) -> Self {
        self.hashtag_retry = hashtags;
        self.step_retry = steps;
        self
    }

    pub fn agents(&self) -> &AgentDirectory {
        &self.agents
    }

    /// Run the whole workflow, reporting each step as it starts
    pub async fn run<P>(&self, description: &str, on_progress: P) -> SeinsightResult<AnalysisReport>
    where
        P: FnMut(ProcessingStep),
    {
        self.run_with_cancel(description, &CancellationToken::new(), on_progress)
            .await
    }

    /// Run the whole workflow, stopping early if `cancel` fires
    pub async fn run_with_cancel<P>(
        &self,
        description: &str,
        cancel: &CancellationToken,
        mut on_progress: P,
    ) -> SeinsightResult<AnalysisReport>
    where
        P: FnMut(ProcessingStep),
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!("[Workflow] Run {} started", run_id);

        on_progress(ProcessingStep::Hashtags);
        let hashtags = self.generate_hashtags(description, cancel).await?;
        tracing::info!("[Workflow] Hashtags: {}", hashtags.join(", "));

        on_progress(ProcessingStep::Twitter);
        let twitter = self.collect_twitter_data(&hashtags, description, cancel).await?;
        let summary = twitter.format_for_analysis();

        on_progress(ProcessingStep::Signals);
        let signals = self.generate_signals(&summary, cancel).await?;

        on_progress(ProcessingStep::Analysis);
        let analysis = self
            .critical_analysis(description, &hashtags, &summary, cancel)
            .await?;

        tracing::info!("[Workflow] Run {} completed", run_id);

        Ok(AnalysisReport {
            run_id,
            description: description.to_string(),
            hashtags,
            twitter,
            signals,
            analysis,
            started_at,
            completed_at: Utc::now(),
        })
    }

    pub async fn generate_hashtags(
        &self,
        description: &str,
        cancel: &CancellationToken,
    ) -> SeinsightResult<Vec<String>> {
        let request = self.request(
            ProcessingStep::Hashtags,
            &self.agents.keywords_generator,
            prompts::hashtag_prompt(description),
        );
        let client = &self.client;
        let request = &request;

        retry_with_backoff(&self.hashtag_retry, "hashtag generation", move || async move {
            let reply = client.exchange_with_cancel(request, cancel).await?;
            let hashtags = parse_hashtags(&reply);
            if hashtags.is_empty() {
                return Err(SeinsightError::EmptyHashtags);
            }
            Ok(hashtags)
        })
        .await
    }

    pub async fn collect_twitter_data(
        &self,
        hashtags: &[String],
        description: &str,
        cancel: &CancellationToken,
    ) -> SeinsightResult<TwitterSummary> {
        let mut request = self.request(
            ProcessingStep::Twitter,
            &self.agents.twitter_collector,
            prompts::collection_prompt(hashtags, description),
        );
        request.message_metadata = request
            .message_metadata
            .map(|m| m.with("hashtags", hashtags.to_vec()));

        let client = &self.client;
        let request = &request;

        retry_with_backoff(&self.step_retry, "twitter collection", move || async move {
            let reply = client.exchange_with_cancel(request, cancel).await?;
            Ok(TwitterSummary::parse(&reply, hashtags))
        })
        .await
    }

    pub async fn generate_signals(
        &self,
        twitter_summary: &str,
        cancel: &CancellationToken,
    ) -> SeinsightResult<String> {
        let request = self.request(
            ProcessingStep::Signals,
            &self.agents.oracle_agent,
            prompts::signal_generation_prompt(twitter_summary),
        );
        self.exchange_with_retry(&request, "signal generation", cancel).await
    }

    pub async fn critical_analysis(
        &self,
        description: &str,
        hashtags: &[String],
        twitter_summary: &str,
        cancel: &CancellationToken,
    ) -> SeinsightResult<String> {
        let request = self.request(
            ProcessingStep::Analysis,
            &self.agents.insights_compiler,
            prompts::critical_analysis_prompt(description, hashtags, twitter_summary),
        );
        self.exchange_with_retry(&request, "critical analysis", cancel).await
    }

    async fn exchange_with_retry(
        &self,
        request: &ExchangeRequest,
        label: &str,
        cancel: &CancellationToken,
    ) -> SeinsightResult<String> {
        let client = &self.client;
        retry_with_backoff(&self.step_retry, label, move || {
            client.exchange_with_cancel(request, cancel)
        })
        .await
    }

    fn request(&self, step: ProcessingStep, agent_id: &str, prompt: String) -> ExchangeRequest {
        ExchangeRequest::new(agent_id, &self.user_id, prompt)
            .with_session_metadata(SessionMetadata::for_session(&self.platform, step.purpose()))
            .with_message_metadata(SessionMetadata::for_message(step.purpose(), step.action()))
    }
}
