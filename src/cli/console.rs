use colored::*;

use crate::core::SeinsightError;
use crate::oracle::{ConnectionStatus, ContractInfo, LatestSignals, PublicationReport};
use crate::workflow::{AnalysisReport, ProcessingStep};

/// Console handles all terminal output with colored formatting
pub struct Console {
    heading_color: Color,
    step_color: Color,
    value_color: Color,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            heading_color: Color::BrightBlue,
            step_color: Color::Cyan,
            value_color: Color::Green,
        }
    }

    /// Create a new Console with custom colors
    pub fn with_colors(heading_color: Color, step_color: Color, value_color: Color) -> Self {
        Self {
            heading_color,
            step_color,
            value_color,
        }
    }

    pub fn print_banner(&self, title: &str) {
        println!("{}", "=".repeat(60).color(self.heading_color));
        println!("{}", format!("  {}", title).color(self.heading_color).bold());
        println!("{}", "=".repeat(60).color(self.heading_color));
        println!();
    }

    /// Print a workflow step as it starts
    pub fn print_step(&self, step: ProcessingStep) {
        println!("{} {}...", "▶".color(self.step_color).bold(), step);
    }

    pub fn print_section(&self, title: &str, body: &str) {
        println!();
        println!("{}", title.color(self.heading_color).bold());
        println!("{}", "-".repeat(60).bright_black());
        println!("{}", body);
    }

    pub fn print_field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14} {}", format!("{}:", label).bold(), value.to_string().color(self.value_color));
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", "!".yellow().bold(), message);
    }

    /// Print a failure: the human-facing text first, details dimmed below
    pub fn print_failure(&self, error: &SeinsightError) {
        eprintln!("{} {}", "Error:".red().bold(), error.user_message());
        eprintln!("  {}", error.to_string().bright_black());
    }

    pub fn print_reply(&self, reply: &str) {
        println!("{}", reply.color(self.value_color));
    }

    pub fn print_analysis(&self, report: &AnalysisReport) {
        self.print_section("Hashtags", &report.hashtags.join(" "));
        self.print_section("Twitter Data", &report.twitter.format_for_analysis());
        self.print_section("Signals", &report.signals);
        self.print_section("Critical Analysis", &report.analysis);
        println!();
        self.print_field("Run", report.run_id);
        self.print_field(
            "Duration",
            format!("{}s", (report.completed_at - report.started_at).num_seconds()),
        );
    }

    pub fn print_publication(&self, report: &PublicationReport) {
        let published = &report.published;
        self.print_success(&format!("Batch {} published", published.batch_id));
        for (rank, (tag, count)) in report.ranked.iter().enumerate() {
            self.print_field(&format!("Signal {}", rank + 1), format!("{} ({} mentions)", tag, count));
        }
        self.print_field("Data hash", &report.digest.data_hash);
        self.print_field("CID", &published.batch.cid);
        self.print_field(
            "Window",
            format!("{} - {}", published.batch.window_start, published.batch.window_end),
        );
        self.print_field("Block", published.block_number);
        self.print_field("Transaction", &report.tx_url);
    }

    pub fn print_oracle_status(
        &self,
        info: &ContractInfo,
        status: &ConnectionStatus,
        latest: Option<&LatestSignals>,
    ) {
        self.print_field("Contract", &info.address);
        self.print_field("Network", format!("{} ({})", info.network, info.chain_id));
        self.print_field("Explorer", &info.contract_url);

        if status.is_ready() {
            self.print_success("Connected");
        } else {
            self.print_warning(status.error.as_deref().unwrap_or("Not connected"));
        }
        if let Some(count) = status.batch_count {
            self.print_field("Batches", count);
        }
        if let Some(latest) = latest {
            self.print_field("Latest", latest.signals.join(", "));
            self.print_field("Latest CID", &latest.cid);
            self.print_field("Window end", latest.window_end);
        }
    }
}
