//! Oracle client against an in-process JSON-RPC node

use std::sync::{Arc, Mutex};

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{hex, keccak256, Address, U256};
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use seinsight::config::OracleConfig;
use seinsight::oracle::bindings::ISignalOracle;
use seinsight::oracle::{now_secs, RpcSignalOracle, SignalBatch, SignalOracle};
use seinsight::SeinsightError;

const CONTRACT: &str = "0x7215b3A349b19ba21a6F34C5F092390c93027a2b";
/// Well-known development key and its address
const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const PUBLISHER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const GWEI: &str = "0x3b9aca00";

struct Node {
    balance_wei: u128,
    /// `eth_getTransactionReceipt` calls answered with `null` first
    pending_polls: usize,
    receipt_status: &'static str,
    emit_event: bool,
    batch_count: u64,
    calls: Vec<String>,
    raw_transactions: Vec<Vec<u8>>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            balance_wei: 1_000_000_000_000_000_000,
            pending_polls: 1,
            receipt_status: "0x1",
            emit_event: true,
            batch_count: 4,
            calls: Vec::new(),
            raw_transactions: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<Node>>;

fn quantity(value: u128) -> Value {
    json!(format!("0x{:x}", value))
}

fn word(value: u64) -> String {
    format!("0x{:064x}", value)
}

fn last_tx_hash(node: &Node) -> String {
    node.raw_transactions
        .last()
        .map(|raw| hex::encode_prefixed(keccak256(raw)))
        .unwrap_or_else(|| word(0))
}

fn receipt(node: &Node) -> Value {
    let tx_hash = last_tx_hash(node);
    let mut logs = Vec::new();
    if node.emit_event {
        let event = ISignalOracle::SignalBatchPublished {
            batchId: U256::from(node.batch_count + 1),
            windowStart: 1,
            windowEnd: 2,
            top3Signals: ["#A".into(), "#B".into(), "#C".into()],
            cid: "cid".into(),
            source: "twitter".into(),
            publisher: PUBLISHER.parse().unwrap(),
        };
        let data = event.encode_log_data();
        logs.push(json!({
            "address": CONTRACT.to_lowercase(),
            "topics": data.topics(),
            "data": data.data,
            "blockHash": word(7),
            "blockNumber": "0x2a",
            "transactionHash": tx_hash,
            "transactionIndex": "0x0",
            "logIndex": "0x0",
            "removed": false
        }));
    }
    json!({
        "type": "0x2",
        "status": node.receipt_status,
        "cumulativeGasUsed": "0x30000",
        "logs": logs,
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": word(7),
        "blockNumber": "0x2a",
        "gasUsed": "0x30000",
        "effectiveGasPrice": GWEI,
        "from": PUBLISHER,
        "to": CONTRACT,
        "contractAddress": null
    })
}

fn eth_call(node: &Node, input: &str) -> Value {
    let input = hex::decode(input).unwrap();
    let encoded = if input[..4] == ISignalOracle::getBatchCountCall::SELECTOR {
        U256::from(node.batch_count).abi_encode()
    } else if input[..4] == ISignalOracle::getLatestSignalsCall::SELECTOR {
        (
            ["#DeFi".to_string(), "#AI".to_string(), "#Web3".to_string()],
            "bafybeiglatest".to_string(),
            1_700_000_000u64,
        )
            .abi_encode_params()
    } else {
        Vec::new()
    };
    json!(hex::encode_prefixed(encoded))
}

async fn rpc(State(state): State<Shared>, Json(request): Json<Value>) -> Json<Value> {
    let mut node = state.lock().unwrap();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = &request["params"];
    node.calls.push(method.clone());

    let result = match method.as_str() {
        "eth_chainId" => quantity(1328),
        "eth_blockNumber" => quantity(42),
        "eth_getBalance" => quantity(node.balance_wei),
        "eth_getCode" => json!("0x6080604052"),
        "eth_getTransactionCount" => quantity(0),
        "eth_estimateGas" => quantity(0x30000),
        "eth_gasPrice" | "eth_maxPriorityFeePerGas" => json!(GWEI),
        "eth_feeHistory" => json!({
            "oldestBlock": "0x29",
            "baseFeePerGas": [GWEI, GWEI],
            "gasUsedRatio": [0.5],
            "reward": [[GWEI]]
        }),
        "eth_call" => {
            let input = params[0]["input"]
                .as_str()
                .or(params[0]["data"].as_str())
                .unwrap_or("0x");
            eth_call(&node, input)
        }
        "eth_sendRawTransaction" => {
            let raw = hex::decode(params[0].as_str().unwrap_or_default()).unwrap();
            node.raw_transactions.push(raw);
            json!(last_tx_hash(&node))
        }
        "eth_getTransactionReceipt" => {
            if node.pending_polls > 0 {
                node.pending_polls -= 1;
                Value::Null
            } else {
                receipt(&node)
            }
        }
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": -32601, "message": "method not found" }
            }))
        }
    };

    Json(json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }))
}

async fn start(node: Node) -> (RpcSignalOracle, Shared) {
    let state: Shared = Arc::new(Mutex::new(node));
    let app = Router::new().route("/", post(rpc)).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = OracleConfig {
        rpc_url: format!("http://{}/", addr),
        private_key: Some(KEY.to_string()),
        receipt_poll_interval_ms: 20,
        receipt_timeout_secs: 1,
        ..Default::default()
    };
    (RpcSignalOracle::new(config).unwrap(), state)
}

fn batch() -> SignalBatch {
    let now = now_secs();
    SignalBatch::new(
        now - 3600,
        now,
        ["#MentalHealth".into(), "#Blockchain".into(), "#Web3".into()],
        "bafybeig0123456789abcdef",
        "twitter",
    )
    .unwrap()
}

#[tokio::test]
async fn test_publish_signs_and_records_batch() {
    let (oracle, state) = start(Node::default()).await;
    let batch = batch();

    let published = oracle.publish(&batch).await.unwrap();

    assert_eq!(published.batch_id, 5);
    assert_eq!(published.block_number, 42);
    assert_eq!(
        published.publisher.parse::<Address>().unwrap(),
        PUBLISHER.parse::<Address>().unwrap()
    );
    assert_eq!(published.batch, batch);

    let node = state.lock().unwrap();
    assert_eq!(published.tx_hash, last_tx_hash(&node));
    assert_eq!(node.raw_transactions.len(), 1);
    assert!(!node.calls.iter().any(|m| m == "eth_sendTransaction"));

    let balance_check = node.calls.iter().position(|m| m == "eth_getBalance").unwrap();
    let send = node.calls.iter().position(|m| m == "eth_sendRawTransaction").unwrap();
    assert!(balance_check < send);

    let tx = TxEnvelope::decode_2718(&mut node.raw_transactions[0].as_slice()).unwrap();
    assert_eq!(tx.chain_id(), Some(1328));
    assert_eq!(tx.to(), Some(CONTRACT.parse::<Address>().unwrap()));

    let call = ISignalOracle::publishSignalBatchCall::abi_decode(tx.input()).unwrap();
    assert_eq!(call.windowStart, batch.window_start);
    assert_eq!(call.windowEnd, batch.window_end);
    assert_eq!(call.top3Signals, batch.signals);
    assert_eq!(call.cid, "bafybeig0123456789abcdef");
    assert_eq!(call.source, "twitter");
}

#[tokio::test]
async fn test_insufficient_balance_stops_before_sending() {
    let (oracle, state) = start(Node {
        balance_wei: 1_000,
        ..Default::default()
    })
    .await;

    let err = oracle.publish(&batch()).await.unwrap_err();

    assert!(matches!(
        err,
        SeinsightError::InsufficientBalance { balance_wei: 1_000, .. }
    ));
    assert!(state.lock().unwrap().raw_transactions.is_empty());
}

#[tokio::test]
async fn test_reverted_transaction() {
    let (oracle, state) = start(Node {
        receipt_status: "0x0",
        ..Default::default()
    })
    .await;

    let err = oracle.publish(&batch()).await.unwrap_err();
    let expected = last_tx_hash(&state.lock().unwrap());
    assert!(matches!(err, SeinsightError::TransactionReverted { ref tx_hash } if *tx_hash == expected));
}

#[tokio::test]
async fn test_missing_event_fails_loudly() {
    let (oracle, _) = start(Node {
        emit_event: false,
        ..Default::default()
    })
    .await;

    let err = oracle.publish(&batch()).await.unwrap_err();
    assert!(matches!(err, SeinsightError::EventNotFound { .. }));
}

#[tokio::test]
async fn test_receipt_timeout() {
    let (oracle, _) = start(Node {
        pending_polls: usize::MAX,
        ..Default::default()
    })
    .await;

    let err = oracle.publish(&batch()).await.unwrap_err();
    assert!(matches!(err, SeinsightError::ReceiptTimeout { .. }));
}

#[tokio::test]
async fn test_read_paths() {
    let (oracle, _) = start(Node::default()).await;

    let status = oracle.validate_connection().await;
    assert!(status.is_ready());
    assert_eq!(status.chain_id, Some(1328));
    assert_eq!(status.batch_count, Some(4));

    assert_eq!(oracle.batch_count().await.unwrap(), 4);

    let latest = oracle.latest_signals().await.unwrap().unwrap();
    assert_eq!(latest.signals[2], "#Web3");
    assert_eq!(latest.cid, "bafybeiglatest");
    assert_eq!(latest.window_end, 1_700_000_000);
}

#[tokio::test]
async fn test_no_batches_yet() {
    let (oracle, _) = start(Node {
        batch_count: 0,
        ..Default::default()
    })
    .await;

    assert!(oracle.latest_signals().await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_node() {
    let oracle = RpcSignalOracle::new(OracleConfig {
        rpc_url: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    })
    .unwrap();

    let status = oracle.validate_connection().await;
    assert!(!status.connected);
    assert!(status.error.is_some());
}
