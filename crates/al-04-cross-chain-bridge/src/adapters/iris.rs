//! HTTP attestation service client.
//!
//! `GET {base}/attestations/0x{burn_id}` answers
//!
//! ```text
//! 200 {"status": "complete", "attestation": "0x…"}
//! 200 {"status": "pending_confirmations", "attestation": "PENDING"}
//! 404 {"error": "Message hash not found"}
//! ```
//!
//! A 404 means the service has not indexed the burn yet and is treated as
//! pending.

use crate::domain::BridgeError;
use crate::ports::outbound::{AttestationService, AttestationStatus};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared_types::{from_hex_prefixed, Hash};
use std::time::Duration;
use tracing::debug;

/// Sandbox endpoint.
pub const IRIS_SANDBOX_URL: &str = "https://iris-api-sandbox.circle.com";

/// Response body of the attestation endpoint.
#[derive(Debug, Deserialize)]
struct AttestationResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    attestation: Option<String>,
}

/// Attestation service over HTTP.
pub struct IrisAttestationClient {
    client: Client,
    base_url: String,
}

impl IrisAttestationClient {
    /// Client for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BridgeError::Attestation(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the sandbox.
    pub fn sandbox() -> Result<Self, BridgeError> {
        Self::new(IRIS_SANDBOX_URL)
    }

    /// URL polled for `burn_id`.
    pub fn attestation_url(&self, burn_id: &Hash) -> String {
        format!("{}/attestations/0x{}", self.base_url, hex::encode(burn_id))
    }
}

fn parse_response(body: AttestationResponse) -> Result<AttestationStatus, BridgeError> {
    match body.status.as_deref() {
        Some("complete") => {
            let text = body
                .attestation
                .ok_or_else(|| BridgeError::Attestation("complete without attestation".into()))?;
            let bytes = from_hex_prefixed(&text)
                .map_err(|e| BridgeError::Attestation(format!("bad attestation hex: {e}")))?;
            if bytes.is_empty() {
                return Err(BridgeError::Attestation("empty attestation".into()));
            }
            Ok(AttestationStatus::Complete(bytes))
        }
        Some("pending_confirmations") | Some("pending") | None => Ok(AttestationStatus::Pending),
        Some(other) => Err(BridgeError::Attestation(format!("unknown status {other}"))),
    }
}

#[async_trait]
impl AttestationService for IrisAttestationClient {
    async fn fetch_attestation(&self, burn_id: &Hash) -> Result<AttestationStatus, BridgeError> {
        let url = self.attestation_url(burn_id);
        debug!("[al-04] GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                BridgeError::Attestation(format!("Cannot connect to {}", self.base_url))
            } else {
                BridgeError::Attestation(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(AttestationStatus::Pending),
            status if status.is_success() => {
                let body: AttestationResponse = response
                    .json()
                    .await
                    .map_err(|e| BridgeError::Attestation(format!("Failed to parse response: {e}")))?;
                parse_response(body)
            }
            status => Err(BridgeError::Attestation(format!("HTTP {status}"))),
        }
    }
}
