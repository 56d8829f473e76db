//! Source-chain wallet over Ethereum JSON-RPC.
//!
//! Sends calls with `eth_sendTransaction`, so the node (or wallet bridge)
//! behind the endpoint holds the key and prompts for approval. Receipts are
//! polled with `eth_getTransactionReceipt`.

use crate::domain::{BridgeError, TxHash};
use crate::ports::outbound::{EvmLog, EvmReceipt, SourceChain};
use al_03_transaction_builder::adapters::rpc_types::{JsonRpcRequest, JsonRpcResponse};
use al_03_transaction_builder::EvmCall;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use shared_types::{from_hex_prefixed, to_hex_prefixed, EthAddress, Hash};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: String,
    topics: Vec<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    status: String,
    logs: Vec<RpcLog>,
}

/// Wallet-backed source-chain client.
pub struct EvmRpcWallet {
    client: Client,
    url: String,
    request_id: AtomicU64,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl EvmRpcWallet {
    /// Client for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BridgeError::SourceChain(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            request_id: AtomicU64::new(1),
            poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(300),
        })
    }

    /// Receipt polling cadence and give-up time.
    pub fn with_receipt_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    async fn call<P: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, BridgeError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        debug!("[al-04] RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BridgeError::SourceChain(format!("Cannot connect to {}", self.url))
                } else {
                    BridgeError::SourceChain(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| BridgeError::SourceChain(format!("Failed to parse response: {e}")))?;

        if let Some(error) = rpc_response.error {
            return Err(BridgeError::SourceChain(format!(
                "{} ({})",
                error.message, error.code
            )));
        }
        Ok(rpc_response.result)
    }
}

fn parse_hash(text: &str) -> Result<Hash, BridgeError> {
    let bytes = from_hex_prefixed(text).map_err(|e| BridgeError::SourceChain(e.to_string()))?;
    Hash::try_from(bytes.as_slice())
        .map_err(|_| BridgeError::SourceChain(format!("bad hash length: {text}")))
}

fn convert_receipt(receipt: RpcReceipt) -> Result<EvmReceipt, BridgeError> {
    let logs = receipt
        .logs
        .into_iter()
        .map(|log| {
            let address: EthAddress = log
                .address
                .parse()
                .map_err(|e| BridgeError::SourceChain(format!("log address: {e}")))?;
            let topics = log
                .topics
                .iter()
                .map(|t| parse_hash(t))
                .collect::<Result<Vec<_>, _>>()?;
            let data =
                from_hex_prefixed(&log.data).map_err(|e| BridgeError::SourceChain(e.to_string()))?;
            Ok(EvmLog {
                address,
                topics,
                data,
            })
        })
        .collect::<Result<Vec<_>, BridgeError>>()?;
    Ok(EvmReceipt {
        tx_hash: parse_hash(&receipt.transaction_hash)?,
        success: receipt.status == "0x1",
        logs,
    })
}

#[async_trait]
impl SourceChain for EvmRpcWallet {
    async fn send_call(&self, call: &EvmCall) -> Result<TxHash, BridgeError> {
        let tx = json!({
            "from": call.from.to_string(),
            "to": call.to.to_string(),
            "data": to_hex_prefixed(&call.data),
            "chainId": format!("0x{:x}", call.chain_id),
        });
        let hash: String = self
            .call("eth_sendTransaction", [tx])
            .await?
            .ok_or_else(|| BridgeError::SourceChain("missing transaction hash".into()))?;
        parse_hash(&hash)
    }

    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<EvmReceipt, BridgeError> {
        let hash = to_hex_prefixed(tx);
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            let receipt: Option<RpcReceipt> =
                self.call("eth_getTransactionReceipt", [&hash]).await?;
            if let Some(receipt) = receipt {
                return convert_receipt(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BridgeError::SourceChain(format!("no receipt for {hash}")));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
