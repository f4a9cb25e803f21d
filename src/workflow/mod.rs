//! Market analysis workflow
//!
//! - `AnalysisWorkflow` - Sequential multi-agent analysis of a business idea
//! - `AgentDirectory` - Which agent serves which step
//! - `prompts` - Prompt templates

pub mod analysis;
pub mod prompts;

pub use analysis::{AgentDirectory, AnalysisReport, AnalysisWorkflow, ProcessingStep};
