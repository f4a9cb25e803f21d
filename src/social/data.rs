//! Twitter-shaped data collected for a business description

use serde::{Deserialize, Serialize};

/// One collected post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub user: String,
    pub created_at: String,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

impl Tweet {
    /// Likes plus retweets, saturating at `u64::MAX`
    pub fn engagement(&self) -> u64 {
        self.like_count.saturating_add(self.retweet_count)
    }
}

/// A batch of collected posts plus optional aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterData {
    pub tweets: Vec<Tweet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_engagement: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_retweets: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
}

impl TwitterData {
    pub fn new(tweets: Vec<Tweet>) -> Self {
        Self {
            tweets,
            ..Default::default()
        }
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> crate::core::SeinsightResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fill in missing aggregates from the tweets themselves
    pub fn with_computed_totals(mut self) -> Self {
        let likes = saturating_sum(self.tweets.iter().map(|t| t.like_count));
        let retweets = saturating_sum(self.tweets.iter().map(|t| t.retweet_count));
        self.total_likes.get_or_insert(likes);
        self.total_retweets.get_or_insert(retweets);
        self.total_engagement.get_or_insert(likes.saturating_add(retweets));
        self
    }

    /// Tweet texts, for hashtag ranking
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.tweets.iter().map(|t| t.text.as_str())
    }

    /// Engagement total, computed if absent
    pub fn engagement(&self) -> u64 {
        self.total_engagement
            .unwrap_or_else(|| saturating_sum(self.tweets.iter().map(Tweet::engagement)))
    }
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn tweet(id: &str, text: &str, retweets: u64, likes: u64) -> Tweet {
        Tweet {
            id: id.to_string(),
            text: text.to_string(),
            user: format!("@user{id}"),
            created_at: "2024-01-15T10:30:00Z".to_string(),
            retweet_count: retweets,
            like_count: likes,
            sentiment: None,
        }
    }

    pub fn sample() -> TwitterData {
        TwitterData::new(vec![
            tweet("1", "Wellness apps on chain #MentalHealth #Blockchain #Web3", 45, 123),
            tweet("2", "Privacy first #MentalHealth #Privacy #Blockchain", 23, 67),
            tweet("3", "Decentralized therapy #Web3 #MentalHealth", 89, 234),
        ])
    }
}
