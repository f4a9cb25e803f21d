//! Content hashing and placeholder content addresses
//!
//! The digest is SHA-256 over a compact JSON encoding of a fixed subset of
//! the collected data, so the same data always hashes the same way. The CID
//! is derived from the digest and is not backed by a real upload.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::SeinsightResult;
use crate::social::{Tweet, TwitterData};

/// Prefix of generated placeholder CIDs
const CID_PREFIX: &str = "bafybeig";

/// Result of hashing one batch of collected data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDigest {
    /// Hex SHA-256 of the canonical encoding
    pub data_hash: String,
    pub cid: String,
    /// Epoch seconds
    pub timestamp: u64,
    pub tweet_count: usize,
    pub total_engagement: u64,
}

#[derive(Serialize)]
struct CanonicalTweet<'a> {
    id: &'a str,
    text: &'a str,
    created_at: &'a str,
    retweet_count: u64,
    like_count: u64,
    user: &'a str,
}

impl<'a> From<&'a Tweet> for CanonicalTweet<'a> {
    fn from(tweet: &'a Tweet) -> Self {
        Self {
            id: &tweet.id,
            text: &tweet.text,
            created_at: &tweet.created_at,
            retweet_count: tweet.retweet_count,
            like_count: tweet.like_count,
            user: &tweet.user,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalData<'a> {
    tweets: Vec<CanonicalTweet<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_engagement: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_likes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_retweets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashtags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collected_at: Option<&'a str>,
}

/// Compact JSON of the hashed fields. Sentiment and any other per-tweet
/// fields are excluded.
pub fn canonical_json(data: &TwitterData) -> SeinsightResult<String> {
    let canonical = CanonicalData {
        tweets: data.tweets.iter().map(CanonicalTweet::from).collect(),
        total_engagement: data.total_engagement,
        total_likes: data.total_likes,
        total_retweets: data.total_retweets,
        hashtags: data.hashtags.as_deref(),
        collected_at: data.collected_at.as_deref(),
    };
    Ok(serde_json::to_string(&canonical)?)
}

/// Hex SHA-256 of the canonical encoding
pub fn data_hash(data: &TwitterData) -> SeinsightResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(data)?.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Placeholder CID: prefix, first 16 hash chars, first 8 base-36 chars of `millis`
pub fn mock_cid(data_hash: &str, millis: u64) -> String {
    let short_hash: String = data_hash.chars().take(16).collect();
    let stamp: String = to_base36(millis).chars().take(8).collect();
    format!("{}{}{}", CID_PREFIX, short_hash, stamp)
}

/// Hash `data` and derive its placeholder CID
pub fn hash_twitter_data(data: &TwitterData) -> SeinsightResult<ContentDigest> {
    let now = chrono::Utc::now();
    let data_hash = data_hash(data)?;
    let cid = mock_cid(&data_hash, now.timestamp_millis().max(0) as u64);

    tracing::info!(
        "[Content] Hashed {} tweets: {}... -> {}",
        data.tweets.len(),
        &data_hash[..16],
        cid
    );

    Ok(ContentDigest {
        data_hash,
        cid,
        timestamp: now.timestamp().max(0) as u64,
        tweet_count: data.tweets.len(),
        total_engagement: data.engagement(),
    })
}

/// Whether `data` still hashes to `stored_hash`
pub fn verify_integrity(data: &TwitterData, stored_hash: &str) -> bool {
    match data_hash(data) {
        Ok(hash) => hash.eq_ignore_ascii_case(stored_hash.trim_start_matches("0x")),
        Err(e) => {
            tracing::error!("[Content] Failed to hash data for verification: {}", e);
            false
        }
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
