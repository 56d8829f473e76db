//! # Outbound Ports
//!
//! Collaborators the builder depends on: the network (anchors, submission,
//! statuses, accounts) and the wallet that signs.

use crate::domain::{
    AccountData, BuilderError, LivenessAnchor, SignedTransaction, TxSignature, TxStatus,
    UnsignedTransaction,
};
use async_trait::async_trait;
use shared_types::Pubkey;
use std::sync::Arc;

/// Source of fresh liveness anchors.
#[async_trait]
pub trait BlockhashProvider: Send + Sync {
    /// Latest blockhash and its expiry height.
    async fn latest_anchor(&self) -> Result<LivenessAnchor, BuilderError>;

    /// Current block height.
    async fn block_height(&self) -> Result<u64, BuilderError>;
}

/// Submission and status lookup for signed transactions.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Send wire bytes; returns the transaction id.
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxSignature, BuilderError>;

    /// Status of a signature; `None` if the network has not seen it.
    async fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TxStatus>, BuilderError>;
}

/// "Fetch account by address".
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// One account; `None` if it does not exist.
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<AccountData>, BuilderError>;

    /// Several accounts in one round trip, in request order.
    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountData>>, BuilderError>;
}

#[async_trait]
impl<T: AccountFetcher + ?Sized> AccountFetcher for Arc<T> {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<AccountData>, BuilderError> {
        (**self).fetch_account(address).await
    }

    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountData>>, BuilderError> {
        (**self).fetch_accounts(addresses).await
    }
}

/// External wallet. The builder never holds keys.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Wallet address.
    fn pubkey(&self) -> Pubkey;

    /// Sign, or refuse with `SigningRejected`.
    async fn sign_transaction(
        &self,
        tx: UnsignedTransaction,
    ) -> Result<SignedTransaction, BuilderError>;
}
