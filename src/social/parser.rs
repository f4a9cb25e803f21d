//! Parsing of the collector agent's free-text reply
//!
//! The collector answers in prose with a few labelled figures
//! (`Posts Collected: 8`, `Total Engagement: 1547`). `TwitterSummary` keeps
//! those figures plus the raw text so later prompts can quote both.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::data::TwitterData;

/// Assumed post count when the reply does not state one
const DEFAULT_POST_COUNT: u64 = 8;

/// Structured view of collected social data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterSummary {
    pub total_tweets: u64,
    pub total_engagement: u64,
    pub total_likes: u64,
    pub total_retweets: u64,
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_tweet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_user: Option<String>,
    pub raw: String,
}

fn labelled_number(label: &'static str) -> Regex {
    Regex::new(&format!(r"{}:\s*(\d+)", regex::escape(label))).expect("static label pattern")
}

fn posts_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| labelled_number("Posts Collected"))
}

fn engagement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| labelled_number("Total Engagement"))
}

fn capture_number(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `tenths / 10` of `total`, rounded down, without overflowing
fn share_of(total: u64, tenths: u64) -> u64 {
    total / 10 * tenths + total % 10 * tenths / 10
}

impl TwitterSummary {
    /// Parse a collector reply. Likes and retweets are split 70/30 from the
    /// stated engagement when the reply gives only the total.
    pub fn parse(reply: &str, hashtags: &[String]) -> Self {
        let total_tweets = capture_number(posts_regex(), reply).unwrap_or(DEFAULT_POST_COUNT);
        let total_engagement = capture_number(engagement_regex(), reply).unwrap_or(0);

        Self {
            total_tweets,
            total_engagement,
            total_likes: share_of(total_engagement, 7),
            total_retweets: share_of(total_engagement, 3),
            hashtags: hashtags.to_vec(),
            sentiment: None,
            top_tweet: None,
            top_user: None,
            raw: reply.to_string(),
        }
    }

    /// Summarise structured data directly
    pub fn from_data(data: &TwitterData) -> Self {
        let data = data.clone().with_computed_totals();
        let top = data.tweets.iter().max_by_key(|t| t.engagement());

        Self {
            total_tweets: data.tweets.len() as u64,
            total_engagement: data.engagement(),
            total_likes: data.total_likes.unwrap_or_default(),
            total_retweets: data.total_retweets.unwrap_or_default(),
            hashtags: data.hashtags.clone().unwrap_or_default(),
            sentiment: None,
            top_tweet: top.map(|t| t.text.clone()),
            top_user: top.map(|t| t.user.clone()),
            raw: String::new(),
        }
    }

    /// Render as labelled lines for inclusion in an analysis prompt
    pub fn format_for_analysis(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if self.total_tweets > 0 {
            lines.push(format!("Total Tweets: {}", self.total_tweets));
        }
        if self.total_retweets > 0 {
            lines.push(format!("Total Retweets: {}", self.total_retweets));
        }
        if self.total_likes > 0 {
            lines.push(format!("Total Likes: {}", self.total_likes));
        }
        if self.total_engagement > 0 {
            lines.push(format!("Total Engagement: {}", self.total_engagement));
        }
        if let Some(sentiment) = &self.sentiment {
            lines.push(format!("Overall Sentiment: {}", sentiment));
        }
        if !self.hashtags.is_empty() {
            lines.push(format!("Top Hashtags: {}", self.hashtags.join(", ")));
        }
        if let Some(tweet) = &self.top_tweet {
            lines.push(format!("Top Tweet: {}", tweet));
        }
        if let Some(user) = &self.top_user {
            lines.push(format!("Top User: {}", user));
        }

        if lines.is_empty() {
            return "No Twitter data available for analysis.".to_string();
        }
        lines.join("\n\n")
    }
}
