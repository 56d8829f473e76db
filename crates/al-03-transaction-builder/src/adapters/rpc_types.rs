//! JSON-RPC envelope and the primary-chain response shapes the client reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

impl<'a, P: Serialize> JsonRpcRequest<'a, P> {
    /// New request.
    pub fn new(method: &'a str, params: P, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<R> {
    /// Result on success.
    pub result: Option<R>,
    /// Error on failure.
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Message.
    pub message: String,
    /// Extra data (preflight simulation result, for example).
    #[serde(default)]
    pub data: Option<Value>,
}

/// Result wrapped with the slot it was read at.
#[derive(Debug, Deserialize)]
pub struct WithContext<T> {
    /// Value.
    pub value: T,
}

/// `getLatestBlockhash` value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockhashValue {
    /// Base58 blockhash.
    pub blockhash: String,
    /// Expiry height.
    pub last_valid_block_height: u64,
}

/// One `getSignatureStatuses` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatusValue {
    /// Slot.
    pub slot: u64,
    /// Execution error, if any.
    #[serde(default)]
    pub err: Option<Value>,
    /// `processed` / `confirmed` / `finalized`.
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

/// `getAccountInfo` / `getMultipleAccounts` entry.
#[derive(Debug, Deserialize)]
pub struct AccountValue {
    /// Balance.
    pub lamports: u64,
    /// `[payload, encoding]`.
    pub data: (String, String),
    /// Base58 owner.
    pub owner: String,
}

/// Custom program code inside an `InstructionError` value.
///
/// `{"InstructionError": [0, {"Custom": 6010}]}` yields `6010`.
pub fn custom_error_code(err: &Value) -> Option<u32> {
    err.get("InstructionError")?
        .get(1)?
        .get("Custom")?
        .as_u64()
        .and_then(|c| u32::try_from(c).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_error_code() {
        let err = json!({"InstructionError": [0, {"Custom": 6010}]});
        assert_eq!(custom_error_code(&err), Some(6010));
        assert_eq!(custom_error_code(&json!("AccountInUse")), None);
    }

    #[test]
    fn test_status_parses() {
        let raw = json!({
            "slot": 72,
            "confirmations": 10,
            "err": null,
            "confirmationStatus": "confirmed"
        });
        let status: SignatureStatusValue = serde_json::from_value(raw).unwrap();
        assert_eq!(status.slot, 72);
        assert!(status.err.is_none());
        assert_eq!(status.confirmation_status.as_deref(), Some("confirmed"));
    }
}
