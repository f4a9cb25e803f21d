//! Configuration
//!
//! Loaded from an optional TOML file, then overridden by `SEINSIGHT_*`
//! environment variables. Every field has a default so an empty file (or
//! no file) is a valid configuration.
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:3000/api/messaging"
//!
//! [agents]
//! keywords_generator = "6045e764-c7b4-049a-9288-8a61c67c894c"
//!
//! [poll]
//! interval = 1000
//! max_wait = 120000
//!
//! [oracle]
//! rpc_url = "https://evm-rpc-testnet.sei-apis.com"
//! ```
//!
//! The publisher key is best supplied as `SEINSIGHT_PRIVATE_KEY` rather
//! than written to the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{SeinsightError, SeinsightResult};
use crate::helpers::RetryPolicy;
use crate::session::PollPolicy;
use crate::workflow::AgentDirectory;

/// Agent session API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API root; `/sessions` is appended
    pub base_url: String,
    /// Caller identity sent on session creation
    pub user_id: String,
    /// `platform` value in session metadata
    pub platform: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/messaging".to_string(),
            user_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            platform: "cli".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Oracle contract and chain settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub rpc_url: String,
    pub contract_address: String,
    /// Hex secp256k1 key that signs publish transactions
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    pub network_name: String,
    pub chain_id: u64,
    pub explorer_url: String,
    /// `chain` query parameter appended to explorer links
    pub explorer_chain: String,
    /// Source tag written with each batch
    pub source: String,
    /// Length of the signal window ending now
    pub window_secs: u64,
    /// Minimum publisher balance (0.01 native token by default)
    pub min_balance_wei: u64,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://evm-rpc-testnet.sei-apis.com".to_string(),
            contract_address: "0x7215b3A349b19ba21a6F34C5F092390c93027a2b".to_string(),
            private_key: None,
            network_name: "sei-testnet".to_string(),
            chain_id: 1328,
            explorer_url: "https://seitrace.com".to_string(),
            explorer_chain: "atlantic-2".to_string(),
            source: "twitter".to_string(),
            window_secs: 3600,
            min_balance_wei: 10_000_000_000_000_000,
            receipt_poll_interval_ms: 2000,
            receipt_timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("network_name", &self.network_name)
            .field("chain_id", &self.chain_id)
            .field("explorer_url", &self.explorer_url)
            .field("explorer_chain", &self.explorer_chain)
            .field("source", &self.source)
            .field("window_secs", &self.window_secs)
            .field("min_balance_wei", &self.min_balance_wei)
            .field("receipt_poll_interval_ms", &self.receipt_poll_interval_ms)
            .field("receipt_timeout_secs", &self.receipt_timeout_secs)
            .finish()
    }
}

impl OracleConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Explorer link for a transaction
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!(
            "{}/tx/{}?chain={}",
            self.explorer_url.trim_end_matches('/'),
            tx_hash,
            self.explorer_chain
        )
    }

    /// Explorer link for the contract
    pub fn contract_url(&self) -> String {
        format!(
            "{}/address/{}?chain={}",
            self.explorer_url.trim_end_matches('/'),
            self.contract_address,
            self.explorer_chain
        )
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Also write a daily rolling log file here
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "seinsight=info".to_string(),
            json: false,
            directory: None,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub agents: AgentDirectory,
    pub poll: PollPolicy,
    pub retry: RetryPolicy,
    pub oracle: OracleConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `path` (if given) and apply environment overrides
    pub fn load(path: Option<&Path>) -> SeinsightResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> SeinsightResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| SeinsightError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn from_toml(text: &str) -> SeinsightResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SeinsightError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the clients spin
    pub fn validate(&self) -> SeinsightResult<()> {
        if self.poll.interval.is_zero() {
            return Err(SeinsightError::config("poll.interval must be greater than zero"));
        }
        if self.poll.slow_interval.is_some_and(|d| d.is_zero()) {
            return Err(SeinsightError::config("poll.slow_interval must be greater than zero"));
        }
        if self.oracle.receipt_poll_interval_ms == 0 {
            return Err(SeinsightError::config(
                "oracle.receipt_poll_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Apply `SEINSIGHT_*` overrides read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> SeinsightResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };

        set(&mut self.service.base_url, "SEINSIGHT_API_URL");
        set(&mut self.service.user_id, "SEINSIGHT_USER_ID");
        set(&mut self.agents.keywords_generator, "SEINSIGHT_KEYWORDS_AGENT_ID");
        set(&mut self.agents.twitter_collector, "SEINSIGHT_COLLECTOR_AGENT_ID");
        set(&mut self.agents.insights_compiler, "SEINSIGHT_INSIGHTS_AGENT_ID");
        set(&mut self.agents.oracle_agent, "SEINSIGHT_ORACLE_AGENT_ID");
        set(&mut self.oracle.rpc_url, "SEINSIGHT_RPC_URL");
        set(&mut self.oracle.contract_address, "SEINSIGHT_ORACLE_CONTRACT");
        set(&mut self.logging.level, "SEINSIGHT_LOG");

        if let Some(key) = lookup("SEINSIGHT_PRIVATE_KEY").filter(|v| !v.trim().is_empty()) {
            self.oracle.private_key = Some(key);
        }
        if let Some(dir) = lookup("SEINSIGHT_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.logging.directory = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("SEINSIGHT_POLL_MAX_WAIT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SeinsightError::config(format!("SEINSIGHT_POLL_MAX_WAIT_SECS is not a number: {}", secs))
            })?;
            self.poll.max_wait = Duration::from_secs(secs);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.oracle.chain_id, 1328);
        assert_eq!(config.poll.interval, Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [service]
            base_url = "http://agents.local/api/messaging"

            [poll]
            interval = 2000
            max_wait = 60000

            [retry]
            max_retries = 1
            base_delay_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "http://agents.local/api/messaging");
        assert_eq!(config.service.platform, "cli");
        assert_eq!(config.poll.interval, Duration::from_secs(2));
        assert_eq!(config.poll.max_wait, Duration::from_secs(60));
        assert_eq!(config.poll.slow_after, Some(30));
        assert_eq!(config.retry.max_retries, 1);
    }

    #[test]
    fn test_partial_policy_sections_keep_defaults() {
        let config = Config::from_toml(
            r#"
            [poll]
            max_wait = 30000

            [retry]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.poll.max_wait, Duration::from_secs(30));
        assert_eq!(config.poll.interval, Duration::from_secs(1));
        assert_eq!(config.poll.slow_interval, Some(Duration::from_secs(2)));
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let err = Config::from_toml("[poll]\ninterval = 0").unwrap_err();
        assert!(matches!(err, SeinsightError::Config(ref m) if m.contains("poll.interval")));

        let err = Config::from_toml("[poll]\nslow_interval = 0").unwrap_err();
        assert!(matches!(err, SeinsightError::Config(ref m) if m.contains("slow_interval")));

        let err = Config::from_toml("[oracle]\nreceipt_poll_interval_ms = 0").unwrap_err();
        assert!(matches!(err, SeinsightError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let oracle = OracleConfig {
            private_key: Some("0xsecret".to_string()),
            ..Default::default()
        };
        let shown = format!("{:?}", oracle);
        assert!(!shown.contains("0xsecret"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("[service\nbase_url = 1").unwrap_err();
        assert!(matches!(err, SeinsightError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[oracle]\nprivate_key = \"0xabc\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.oracle.private_key.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SEINSIGHT_API_URL", "http://override/api"),
            ("SEINSIGHT_PRIVATE_KEY", "0xfeed"),
            ("SEINSIGHT_POLL_MAX_WAIT_SECS", "45"),
            ("SEINSIGHT_USER_ID", "  "),
        ]);

        let config = Config::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.service.base_url, "http://override/api");
        assert_eq!(config.oracle.private_key.as_deref(), Some("0xfeed"));
        assert_eq!(config.poll.max_wait, Duration::from_secs(45));
        assert_eq!(config.service.user_id, ServiceConfig::default().user_id);
    }

    #[test]
    fn test_bad_env_number() {
        let err = Config::default()
            .with_env_overrides(|k| (k == "SEINSIGHT_POLL_MAX_WAIT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, SeinsightError::Config(_)));
    }

    #[test]
    fn test_explorer_links() {
        let oracle = OracleConfig::default();
        assert_eq!(oracle.tx_url("0x1"), "https://seitrace.com/tx/0x1?chain=atlantic-2");
        assert!(oracle.contract_url().contains(&oracle.contract_address));
    }
}
