//! Signal oracle contract access
//!
//! [`SignalOracle`] is the seam between the publication pipeline and the
//! chain. [`RpcSignalOracle`] reads through a JSON-RPC provider and signs
//! publish transactions locally with the configured private key.

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{hex, Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};

use crate::config::OracleConfig;
use crate::core::{SeinsightError, SeinsightResult};

use super::batch::{now_secs, PublishedBatch, SignalBatch};
use super::bindings::ISignalOracle::{self, ISignalOracleInstance, SignalBatchPublished};

/// Most recent batch as returned by `getLatestSignals()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestSignals {
    pub signals: [String; 3],
    pub cid: String,
    pub window_end: u64,
}

/// Result of probing the node and contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub chain_id: Option<u64>,
    pub contract_deployed: bool,
    pub batch_count: Option<u64>,
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn is_ready(&self) -> bool {
        self.connected && self.contract_deployed
    }
}

/// Static description of the configured contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub network: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub contract_url: String,
}

/// Read and write access to the signal oracle contract
#[async_trait]
pub trait SignalOracle: Send + Sync {
    /// Submit a batch and wait until it is recorded
    async fn publish(&self, batch: &SignalBatch) -> SeinsightResult<PublishedBatch>;

    /// Number of batches recorded so far
    async fn batch_count(&self) -> SeinsightResult<u64>;

    /// Latest batch, or `None` if nothing was published yet
    async fn latest_signals(&self) -> SeinsightResult<Option<LatestSignals>>;

    /// Probe the node and contract; never fails, errors are reported in the status
    async fn validate_connection(&self) -> ConnectionStatus;

    fn contract_info(&self) -> ContractInfo;

    /// Explorer link for a transaction
    fn tx_url(&self, tx_hash: &str) -> String;
}

fn chain_error(err: impl std::fmt::Display) -> SeinsightError {
    SeinsightError::Rpc(err.to_string())
}

/// [`SignalOracle`] backed by a JSON-RPC node
pub struct RpcSignalOracle {
    rpc_url: Url,
    contract: ISignalOracleInstance<DynProvider>,
    config: OracleConfig,
}

impl RpcSignalOracle {
    /// Parse the endpoint and contract address; no network traffic happens here
    pub fn new(config: OracleConfig) -> SeinsightResult<Self> {
        let rpc_url: Url = config.rpc_url.parse().map_err(|e| {
            SeinsightError::config(format!("invalid oracle.rpc_url {:?}: {}", config.rpc_url, e))
        })?;
        let address: Address = config.contract_address.parse().map_err(|e| {
            SeinsightError::config(format!(
                "invalid oracle.contract_address {:?}: {}",
                config.contract_address, e
            ))
        })?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();

        Ok(Self {
            rpc_url,
            contract: ISignalOracle::new(address, provider),
            config,
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn provider(&self) -> &DynProvider {
        self.contract.provider()
    }

    fn signer(&self) -> SeinsightResult<PrivateKeySigner> {
        let key = self
            .config
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SeinsightError::config("oracle.private_key is not set"))?;

        // The parse error never echoes the key
        key.parse::<PrivateKeySigner>()
            .map_err(|e| SeinsightError::config(format!("invalid oracle private key: {}", e)))
    }

    async fn ensure_balance(&self, account: Address) -> SeinsightResult<()> {
        let balance = self.provider().get_balance(account).await.map_err(chain_error)?;
        let required = U256::from(self.config.min_balance_wei);

        tracing::debug!("[Oracle] Balance of {}: {} wei", account, balance);

        if balance < required {
            return Err(SeinsightError::InsufficientBalance {
                balance_wei: u128::try_from(balance).unwrap_or(u128::MAX),
                required_wei: u128::from(self.config.min_balance_wei),
            });
        }
        Ok(())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> SeinsightResult<TransactionReceipt> {
        let deadline = Instant::now() + self.config.receipt_timeout();

        loop {
            match self.provider().get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) => tracing::debug!("[Oracle] Receipt lookup for {} failed: {}", tx_hash, e),
            }

            if Instant::now() + self.config.receipt_poll_interval() > deadline {
                return Err(SeinsightError::ReceiptTimeout {
                    tx_hash: hex::encode_prefixed(tx_hash),
                });
            }
            sleep(self.config.receipt_poll_interval()).await;
        }
    }
}

#[async_trait]
impl SignalOracle for RpcSignalOracle {
    async fn publish(&self, batch: &SignalBatch) -> SeinsightResult<PublishedBatch> {
        batch.validate(now_secs())?;

        let signer = self.signer()?;
        let publisher = signer.address();
        self.ensure_balance(publisher).await?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone())
            .erased();
        let contract = ISignalOracle::new(*self.contract.address(), provider);

        tracing::info!(
            "[Oracle] Publishing batch [{}] window {}..{} from {}",
            batch.signals.join(", "),
            batch.window_start,
            batch.window_end,
            publisher
        );

        let pending = contract
            .publishSignalBatch(
                batch.window_start,
                batch.window_end,
                batch.signals.clone(),
                batch.cid.clone(),
                batch.source.clone(),
            )
            .send()
            .await
            .map_err(chain_error)?;
        let tx_hash = *pending.tx_hash();
        tracing::info!("[Oracle] Transaction sent: {}", tx_hash);

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.status() {
            return Err(SeinsightError::TransactionReverted {
                tx_hash: hex::encode_prefixed(tx_hash),
            });
        }

        let batch_id = extract_batch_id(&receipt, *self.contract.address())?;
        let block_number = receipt.block_number().unwrap_or_default();

        tracing::info!("[Oracle] Batch {} confirmed in block {}", batch_id, block_number);

        Ok(PublishedBatch {
            batch: batch.clone(),
            batch_id,
            publisher: publisher.to_string(),
            published_at: now_secs(),
            tx_hash: hex::encode_prefixed(tx_hash),
            block_number,
        })
    }

    async fn batch_count(&self) -> SeinsightResult<u64> {
        let count = self.contract.getBatchCount().call().await.map_err(chain_error)?;
        u64::try_from(count)
            .map_err(|_| SeinsightError::AbiDecode(format!("batch count {} too large", count)))
    }

    async fn latest_signals(&self) -> SeinsightResult<Option<LatestSignals>> {
        if self.batch_count().await? == 0 {
            return Ok(None);
        }
        let latest = self.contract.getLatestSignals().call().await.map_err(chain_error)?;

        Ok(Some(LatestSignals {
            signals: latest.top3Signals,
            cid: latest.cid,
            window_end: latest.windowEnd,
        }))
    }

    async fn validate_connection(&self) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();

        match self.provider().get_chain_id().await {
            Ok(id) => {
                status.connected = true;
                status.chain_id = Some(id);
                if id != self.config.chain_id {
                    tracing::warn!(
                        "[Oracle] Node reports chain {} but {} is configured",
                        id,
                        self.config.chain_id
                    );
                }
            }
            Err(e) => {
                status.error = Some(e.to_string());
                return status;
            }
        }

        match self.provider().get_code_at(*self.contract.address()).await {
            Ok(code) => status.contract_deployed = !code.is_empty(),
            Err(e) => {
                status.error = Some(e.to_string());
                return status;
            }
        }

        if !status.contract_deployed {
            status.error = Some(format!("no contract code at {}", self.config.contract_address));
            return status;
        }

        match self.batch_count().await {
            Ok(count) => status.batch_count = Some(count),
            Err(e) => status.error = Some(e.to_string()),
        }
        status
    }

    fn contract_info(&self) -> ContractInfo {
        ContractInfo {
            address: self.config.contract_address.clone(),
            network: self.config.network_name.clone(),
            chain_id: self.config.chain_id,
            explorer_url: self.config.explorer_url.clone(),
            contract_url: self.config.contract_url(),
        }
    }

    fn tx_url(&self, tx_hash: &str) -> String {
        self.config.tx_url(tx_hash)
    }
}

/// Batch id from the `SignalBatchPublished` log emitted by `contract`
pub fn extract_batch_id(receipt: &TransactionReceipt, contract: Address) -> SeinsightResult<u64> {
    let log = receipt
        .inner
        .logs()
        .iter()
        .find(|log| {
            log.address() == contract && log.topic0() == Some(&SignalBatchPublished::SIGNATURE_HASH)
        })
        .ok_or_else(|| SeinsightError::EventNotFound {
            tx_hash: hex::encode_prefixed(receipt.transaction_hash),
            event: "SignalBatchPublished".to_string(),
        })?;

    let event = log
        .log_decode::<SignalBatchPublished>()
        .map_err(|e| SeinsightError::AbiDecode(e.to_string()))?;
    let id = event.inner.data.batchId;
    u64::try_from(id).map_err(|_| SeinsightError::AbiDecode(format!("batch id {} too large", id)))
}
