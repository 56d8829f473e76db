//! # EVM Calldata
//!
//! Solidity ABI encoding for the two calls a bridge transfer needs. Every
//! static argument occupies one big-endian 32-byte word.

use shared_crypto::selector;
use shared_types::EthAddress;

/// `approve(address,uint256)` selector.
pub fn approve_selector() -> [u8; 4] {
    selector("approve(address,uint256)")
}

/// `depositForBurn(uint256,uint32,bytes32,address)` selector.
pub fn deposit_for_burn_selector() -> [u8; 4] {
    selector("depositForBurn(uint256,uint32,bytes32,address)")
}

/// Unsigned integer as a 32-byte word.
pub fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Address left-padded to a word.
pub fn address_word(address: &EthAddress) -> [u8; 32] {
    address.to_bytes32()
}

/// Calldata for `approve(spender, amount)`.
pub fn encode_approve(spender: &EthAddress, amount: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 64);
    out.extend_from_slice(&approve_selector());
    out.extend_from_slice(&address_word(spender));
    out.extend_from_slice(&uint_word(u128::from(amount)));
    out
}

/// Calldata for `depositForBurn(amount, destinationDomain, mintRecipient, burnToken)`.
pub fn encode_deposit_for_burn(
    amount: u64,
    destination_domain: u32,
    mint_recipient: &[u8; 32],
    burn_token: &EthAddress,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 128);
    out.extend_from_slice(&deposit_for_burn_selector());
    out.extend_from_slice(&uint_word(u128::from(amount)));
    out.extend_from_slice(&uint_word(u128::from(destination_domain)));
    out.extend_from_slice(mint_recipient);
    out.extend_from_slice(&address_word(burn_token));
    out
}
