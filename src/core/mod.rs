//! Core types shared across the crate
//!
//! - `SeinsightError` - Error type for every fallible operation
//! - `SeinsightResult` - Result alias

pub mod error;

pub use error::{SeinsightError, SeinsightResult};
