//! # Inbound Ports (Driving Ports)
//!
//! The API the bridge offers to hosts and UIs.

use crate::domain::{BridgeError, BridgeRequest, BridgeSession, SessionId};
use async_trait::async_trait;
use shared_types::Hash;

/// Primary bridge API.
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Persist a session and drive it in the background.
    async fn initiate_bridge(&self, request: BridgeRequest) -> Result<SessionId, BridgeError>;

    /// Persist a session and drive it inline to Relayed, Failed or Stuck.
    async fn execute_bridge(&self, request: BridgeRequest) -> Result<BridgeSession, BridgeError>;

    /// Resume the session for a burn identifier.
    async fn resume(&self, burn_id: Hash) -> Result<BridgeSession, BridgeError>;

    /// Resume every stuck or orphaned post-burn session.
    async fn resume_stuck(&self) -> Result<Vec<BridgeSession>, BridgeError>;

    /// Abandon a session before its burn.
    async fn cancel(&self, id: SessionId) -> Result<BridgeSession, BridgeError>;

    /// Session by id.
    async fn get_session(&self, id: SessionId) -> Result<Option<BridgeSession>, BridgeError>;

    /// Session by burn identifier.
    async fn find_by_burn(&self, burn_id: Hash) -> Result<Option<BridgeSession>, BridgeError>;
}
