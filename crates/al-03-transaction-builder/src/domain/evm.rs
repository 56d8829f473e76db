//! # Secondary Chain Calls
//!
//! Network parameters and the unsigned EVM calls of a bridge transfer.

use serde::{Deserialize, Serialize};
use shared_types::EthAddress;

/// Ethereum Sepolia chain id.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// CCTP domain of Ethereum.
pub const ETHEREUM_DOMAIN: u32 = 0;

/// TokenMessenger on Sepolia (`0x9f3B8679c73C2F338593d1268802e00a6FD98a60`).
pub const SEPOLIA_TOKEN_MESSENGER: EthAddress = EthAddress([
    0x9f, 0x3b, 0x86, 0x79, 0xc7, 0x3c, 0x2f, 0x33, 0x85, 0x93, 0xd1, 0x26, 0x88, 0x02, 0xe0, 0x0a,
    0x6f, 0xd9, 0x8a, 0x60,
]);

/// USDC on Sepolia (`0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238`).
pub const SEPOLIA_USDC: EthAddress = EthAddress([
    0x1c, 0x7d, 0x4b, 0x19, 0x6c, 0xb0, 0xc7, 0xb0, 0x1d, 0x74, 0x3f, 0xbc, 0x61, 0x16, 0xa9, 0x02,
    0x37, 0x9c, 0x72, 0x38,
]);

/// Source chain contracts and identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmNetwork {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// CCTP domain of this chain.
    pub domain: u32,
    /// Contract that burns and emits the message.
    pub token_messenger: EthAddress,
    /// Token being burned.
    pub usdc: EthAddress,
}

impl EvmNetwork {
    /// Ethereum Sepolia testnet.
    pub const fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            domain: ETHEREUM_DOMAIN,
            token_messenger: SEPOLIA_TOKEN_MESSENGER,
            usdc: SEPOLIA_USDC,
        }
    }
}

impl Default for EvmNetwork {
    fn default() -> Self {
        Self::sepolia()
    }
}

/// One unsigned contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmCall {
    /// Chain to submit on.
    pub chain_id: u64,
    /// Sender wallet.
    pub from: EthAddress,
    /// Contract called.
    pub to: EthAddress,
    /// ABI calldata.
    #[serde(with = "shared_types::hex_serde")]
    pub data: Vec<u8>,
}

/// The approve and burn calls of one bridge transfer, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCalls {
    /// Lets the TokenMessenger pull `amount` of USDC.
    pub approve: EvmCall,
    /// Burns and emits the cross-chain message.
    pub burn: EvmCall,
    /// 32-byte destination the minted value is credited to.
    #[serde(with = "shared_types::hex_serde")]
    pub mint_recipient: [u8; 32],
    /// Destination CCTP domain.
    pub destination_domain: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sepolia_addresses() {
        assert_eq!(
            SEPOLIA_TOKEN_MESSENGER.to_string(),
            "0x9f3b8679c73c2f338593d1268802e00a6fd98a60"
        );
        assert_eq!(
            SEPOLIA_USDC.to_string(),
            "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238"
        );
    }
}
