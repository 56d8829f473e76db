//! # Adapters Layer
//!
//! HTTP JSON-RPC network client and a local keypair wallet.

pub mod keypair;
pub mod rpc;
pub mod rpc_types;

pub use keypair::KeypairSigner;
pub use rpc::{SolanaRpcClient, DEVNET_URL, MAX_MULTIPLE_ACCOUNTS};
