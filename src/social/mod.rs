//! Social media data model
//!
//! - `TwitterData` / `Tweet` - collected posts, as hashed for the oracle
//! - `TwitterSummary` - figures parsed from a collector agent reply

pub mod data;
pub mod parser;

pub use data::{Tweet, TwitterData};
pub use parser::TwitterSummary;
