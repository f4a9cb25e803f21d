pub mod core;
pub mod session;

// Agent workflow
pub mod helpers;
pub mod social;
pub mod workflow;

// On-chain publication
pub mod oracle;

// Application plumbing
pub mod cli;
pub mod config;
pub mod logging;

pub use config::Config;
pub use core::{SeinsightError, SeinsightResult};
