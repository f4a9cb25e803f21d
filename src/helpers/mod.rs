//! Small reusable helpers
//!
//! - `retry_with_backoff` - Retry an async operation with exponential backoff
//! - `parse_hashtags` / `rank_hashtags` - Hashtag extraction and frequency ranking

mod hashtags;
mod retry;

pub use hashtags::{
    extract_hashtags, parse_hashtags, rank_hashtags, top_three_signals, MAX_GENERATED_HASHTAGS,
};
pub use retry::{retry_with_backoff, RetryPolicy};
