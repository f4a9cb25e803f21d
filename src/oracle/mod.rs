//! On-chain signal oracle
//!
//! - `SignalBatch` - The record written per window, with validation
//! - `content` - Data hashing and placeholder content addresses
//! - `bindings` - Contract ABI for the oracle
//! - `SignalOracle` / `RpcSignalOracle` - Contract access
//! - `SignalPublisher` - Data to published batch

pub mod batch;
pub mod bindings;
pub mod content;
pub mod contract;
pub mod publisher;

pub use batch::{now_secs, BatchValidationError, PublishedBatch, SignalBatch};
pub use content::{data_hash, hash_twitter_data, verify_integrity, ContentDigest};
pub use contract::{
    ConnectionStatus, ContractInfo, LatestSignals, RpcSignalOracle, SignalOracle,
};
pub use publisher::{PreparedBatch, PublicationReport, SignalPublisher};
