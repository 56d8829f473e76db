//! Primary-chain JSON-RPC client.
//!
//! Implements the network ports over HTTP: `getLatestBlockhash`,
//! `getBlockHeight`, `sendTransaction`, `getSignatureStatuses`,
//! `getAccountInfo` and `getMultipleAccounts`.

use super::rpc_types::{
    custom_error_code, AccountValue, BlockhashValue, JsonRpcRequest, JsonRpcResponse,
    SignatureStatusValue, WithContext,
};
use crate::domain::{
    AccountData, BuilderError, Commitment, LivenessAnchor, ProgramFailure, SignedTransaction,
    TxSignature, TxStatus,
};
use crate::ports::outbound::{AccountFetcher, BlockhashProvider, TransactionSubmitter};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use shared_types::Pubkey;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Public devnet endpoint.
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// Largest batch `getMultipleAccounts` accepts.
pub const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// HTTP JSON-RPC client.
pub struct SolanaRpcClient {
    client: Client,
    url: String,
    commitment: Commitment,
    request_id: AtomicU64,
}

impl SolanaRpcClient {
    /// Client reading at `Confirmed`.
    pub fn new(url: impl Into<String>) -> Result<Self, BuilderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            commitment: Commitment::Confirmed,
            request_id: AtomicU64::new(1),
        })
    }

    /// Read and preflight at another commitment.
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method.
    async fn call<P: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, BuilderError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        debug!("[al-03] RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BuilderError::Network(format!("Cannot connect to {}", self.url))
                } else {
                    BuilderError::from(e)
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| BuilderError::Network(format!("Failed to parse response: {e}")))?;

        if let Some(error) = rpc_response.error {
            // Preflight failures carry the simulated program error.
            let program_code = error
                .data
                .as_ref()
                .and_then(|d| d.get("err"))
                .and_then(custom_error_code);
            if program_code.is_some() {
                return Err(BuilderError::from_program_failure(program_code, error.message));
            }
            return Err(BuilderError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| BuilderError::Network("Missing result in response".to_string()))
    }

    fn config(&self) -> Value {
        json!({ "commitment": self.commitment.as_str() })
    }

    fn account_config(&self) -> Value {
        json!({ "commitment": self.commitment.as_str(), "encoding": "base64" })
    }
}

fn decode_account(value: Option<AccountValue>) -> Result<Option<AccountData>, BuilderError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.data.1 != "base64" {
        return Err(BuilderError::Codec(format!(
            "unexpected account encoding {}",
            value.data.1
        )));
    }
    let data = BASE64
        .decode(value.data.0.as_bytes())
        .map_err(|e| BuilderError::Codec(e.to_string()))?;
    let owner: Pubkey = value
        .owner
        .parse()
        .map_err(|e| BuilderError::Codec(format!("owner: {e}")))?;
    Ok(Some(AccountData {
        lamports: value.lamports,
        data,
        owner,
    }))
}

#[async_trait]
impl BlockhashProvider for SolanaRpcClient {
    async fn latest_anchor(&self) -> Result<LivenessAnchor, BuilderError> {
        let result: WithContext<BlockhashValue> =
            self.call("getLatestBlockhash", [self.config()]).await?;
        let bytes = bs58::decode(&result.value.blockhash)
            .into_vec()
            .map_err(|e| BuilderError::Codec(e.to_string()))?;
        let blockhash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BuilderError::Codec("blockhash is not 32 bytes".into()))?;
        Ok(LivenessAnchor {
            blockhash,
            last_valid_block_height: result.value.last_valid_block_height,
        })
    }

    async fn block_height(&self) -> Result<u64, BuilderError> {
        self.call("getBlockHeight", [self.config()]).await
    }
}

#[async_trait]
impl TransactionSubmitter for SolanaRpcClient {
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxSignature, BuilderError> {
        let encoded = BASE64.encode(tx.serialize());
        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base64",
                        "preflightCommitment": self.commitment.as_str()
                    }
                ]),
            )
            .await?;
        signature
            .parse()
            .map_err(|e: String| BuilderError::Codec(format!("signature: {e}")))
    }

    async fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TxStatus>, BuilderError> {
        let result: WithContext<Vec<Option<SignatureStatusValue>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": true }]),
            )
            .await?;
        let Some(Some(value)) = result.value.into_iter().next() else {
            return Ok(None);
        };
        let confirmation = value
            .confirmation_status
            .as_deref()
            .and_then(|s| s.parse::<Commitment>().ok());
        let error = value.err.map(|err| ProgramFailure {
            code: custom_error_code(&err),
            message: err.to_string(),
        });
        Ok(Some(TxStatus {
            slot: value.slot,
            confirmation,
            error,
        }))
    }
}

#[async_trait]
impl AccountFetcher for SolanaRpcClient {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<AccountData>, BuilderError> {
        let result: WithContext<Option<AccountValue>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), self.account_config()]),
            )
            .await?;
        decode_account(result.value)
    }

    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountData>>, BuilderError> {
        let mut out = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let keys: Vec<String> = chunk.iter().map(ToString::to_string).collect();
            let result: WithContext<Vec<Option<AccountValue>>> = self
                .call("getMultipleAccounts", json!([keys, self.account_config()]))
                .await?;
            if result.value.len() != chunk.len() {
                return Err(BuilderError::Network(format!(
                    "getMultipleAccounts returned {} entries for {} keys",
                    result.value.len(),
                    chunk.len()
                )));
            }
            for value in result.value {
                out.push(decode_account(value)?);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_account_base64() {
        let value = AccountValue {
            lamports: 42,
            data: (BASE64.encode([1u8, 2, 3]), "base64".into()),
            owner: "11111111111111111111111111111111".into(),
        };
        let account = decode_account(Some(value)).unwrap().unwrap();
        assert_eq!(account.lamports, 42);
        assert_eq!(account.data, vec![1, 2, 3]);
        assert_eq!(account.owner, Pubkey::default());
        assert!(decode_account(None).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = SolanaRpcClient::new("http://127.0.0.1:1").unwrap();
        let err = client.block_height().await.unwrap_err();
        assert!(err.is_retryable());
    }
}
