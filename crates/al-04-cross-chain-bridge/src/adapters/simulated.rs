//! Simulated source chain and attestation service.
//!
//! The source chain interprets the approve and `depositForBurn` calldata,
//! builds a well-formed cross-chain message for each burn and emits it in a
//! `MessageSent` log. The attestation service signs `keccak256(message)`
//! with real secp256k1 attester keys, so credits relayed from here pass the
//! ledger's quorum check.
//!
//! Both expose failure knobs for exercising the orchestrator's recovery
//! paths.

use crate::algorithms::{burn_id, encode_message_sent, message_sent_topic};
use crate::domain::{BridgeError, TxHash};
use crate::ports::outbound::{
    AttestationService, AttestationStatus, EvmLog, EvmReceipt, SourceChain,
};
use al_02_settlement::{BurnMessage, CctpMessage};
use al_03_transaction_builder::algorithms::abi::{approve_selector, deposit_for_burn_selector};
use al_03_transaction_builder::{EvmCall, EvmNetwork};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::{keccak256, AttesterKey};
use shared_types::{EthAddress, Hash};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// MessageTransmitter on Sepolia (`0x7865fAfC2db2093669d92c0F33AeEF291086BEFD`).
pub const SEPOLIA_MESSAGE_TRANSMITTER: EthAddress = EthAddress([
    0x78, 0x65, 0xfa, 0xfc, 0x2d, 0xb2, 0x09, 0x36, 0x69, 0xd9, 0x2c, 0x0f, 0x33, 0xae, 0xef, 0x29,
    0x10, 0x86, 0xbe, 0xfd,
]);

const DEPOSIT_FOR_BURN_LEN: usize = 4 + 4 * 32;

/// Failure knobs for [`SimulatedSourceChain`].
#[derive(Clone, Debug, Default)]
pub struct SourceChainFaults {
    /// Wallet refuses every send.
    pub reject_sends: bool,
    /// Approvals are mined but revert.
    pub revert_approve: bool,
    /// Burns are mined but revert.
    pub revert_burn: bool,
    /// Burn receipts fail to arrive this many times.
    pub lose_burn_receipts: u32,
    /// Burns are mined without a `MessageSent` log.
    pub drop_message_log: bool,
}

#[derive(Default)]
struct ChainState {
    faults: SourceChainFaults,
    tx_counter: u64,
    nonce: u64,
    receipts: HashMap<TxHash, EvmReceipt>,
    burn_txs: HashSet<TxHash>,
    messages: HashMap<Hash, Vec<u8>>,
    sent: Vec<EvmCall>,
}

struct DecodedBurn {
    amount: u64,
    destination_domain: u32,
    mint_recipient: [u8; 32],
    burn_token: [u8; 32],
}

fn decode_deposit_for_burn(data: &[u8]) -> Result<DecodedBurn, BridgeError> {
    if data.len() != DEPOSIT_FOR_BURN_LEN || data[..4] != deposit_for_burn_selector() {
        return Err(BridgeError::SourceChain("malformed depositForBurn".into()));
    }
    let word = |i: usize| &data[4 + i * 32..4 + (i + 1) * 32];
    if word(0)[..24].iter().any(|b| *b != 0) {
        return Err(BridgeError::SourceChain("amount exceeds u64".into()));
    }
    let mut amount = [0u8; 8];
    amount.copy_from_slice(&word(0)[24..]);
    let mut domain = [0u8; 4];
    domain.copy_from_slice(&word(1)[28..]);
    let mut mint_recipient = [0u8; 32];
    mint_recipient.copy_from_slice(word(2));
    let mut burn_token = [0u8; 32];
    burn_token.copy_from_slice(word(3));
    Ok(DecodedBurn {
        amount: u64::from_be_bytes(amount),
        destination_domain: u32::from_be_bytes(domain),
        mint_recipient,
        burn_token,
    })
}

/// In-process source chain.
pub struct SimulatedSourceChain {
    network: EvmNetwork,
    state: Mutex<ChainState>,
}

impl SimulatedSourceChain {
    /// Chain hosting `network`'s contracts.
    pub fn new(network: EvmNetwork) -> Self {
        Self {
            network,
            state: Mutex::new(ChainState::default()),
        }
    }

    /// Replace the failure knobs.
    pub fn set_faults(&self, faults: SourceChainFaults) {
        self.state.lock().faults = faults;
    }

    /// Calls sent so far.
    pub fn sent_calls(&self) -> Vec<EvmCall> {
        self.state.lock().sent.clone()
    }

    /// Number of burns mined.
    pub fn burn_count(&self) -> usize {
        self.state.lock().burn_txs.len()
    }

    /// Message emitted for a burn identifier.
    pub fn message_for(&self, burn_id: &Hash) -> Option<Vec<u8>> {
        self.state.lock().messages.get(burn_id).cloned()
    }

    fn next_tx_hash(state: &mut ChainState) -> TxHash {
        state.tx_counter += 1;
        let mut seed = b"simulated-tx".to_vec();
        seed.extend_from_slice(&state.tx_counter.to_be_bytes());
        keccak256(&seed)
    }

    fn mine_burn(&self, state: &mut ChainState, call: &EvmCall) -> Result<EvmReceipt, BridgeError> {
        let burn = decode_deposit_for_burn(&call.data)?;
        let tx_hash = Self::next_tx_hash(state);
        state.burn_txs.insert(tx_hash);
        if state.faults.revert_burn {
            return Ok(EvmReceipt {
                tx_hash,
                success: false,
                logs: Vec::new(),
            });
        }

        let nonce = state.nonce;
        state.nonce += 1;
        let message = CctpMessage {
            version: 0,
            source_domain: self.network.domain,
            destination_domain: burn.destination_domain,
            nonce,
            sender: self.network.token_messenger.to_bytes32(),
            recipient: [0u8; 32],
            destination_caller: [0u8; 32],
            body: BurnMessage {
                version: 0,
                burn_token: burn.burn_token,
                mint_recipient: burn.mint_recipient,
                amount: burn.amount,
                message_sender: call.from.to_bytes32(),
            },
        }
        .encode();
        state.messages.insert(burn_id(&message), message.clone());

        let logs = if state.faults.drop_message_log {
            Vec::new()
        } else {
            vec![EvmLog {
                address: SEPOLIA_MESSAGE_TRANSMITTER,
                topics: vec![message_sent_topic()],
                data: encode_message_sent(&message),
            }]
        };
        Ok(EvmReceipt {
            tx_hash,
            success: true,
            logs,
        })
    }
}

#[async_trait]
impl SourceChain for SimulatedSourceChain {
    async fn send_call(&self, call: &EvmCall) -> Result<TxHash, BridgeError> {
        let mut state = self.state.lock();
        if state.faults.reject_sends {
            return Err(BridgeError::SourceChain("user rejected the request".into()));
        }
        if call.chain_id != self.network.chain_id {
            return Err(BridgeError::SourceChain(format!(
                "wrong chain {}",
                call.chain_id
            )));
        }
        state.sent.push(call.clone());

        let receipt = if call.to == self.network.usdc && call.data.starts_with(&approve_selector())
        {
            EvmReceipt {
                tx_hash: Self::next_tx_hash(&mut state),
                success: !state.faults.revert_approve,
                logs: Vec::new(),
            }
        } else if call.to == self.network.token_messenger {
            self.mine_burn(&mut state, call)?
        } else {
            return Err(BridgeError::SourceChain(format!("unknown contract {}", call.to)));
        };

        debug!("[al-04] Simulated tx 0x{}", hex::encode(receipt.tx_hash));
        let tx_hash = receipt.tx_hash;
        state.receipts.insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<EvmReceipt, BridgeError> {
        let mut state = self.state.lock();
        if state.burn_txs.contains(tx) && state.faults.lose_burn_receipts > 0 {
            state.faults.lose_burn_receipts -= 1;
            return Err(BridgeError::SourceChain("receipt request timed out".into()));
        }
        state
            .receipts
            .get(tx)
            .cloned()
            .ok_or_else(|| BridgeError::SourceChain(format!("unknown tx 0x{}", hex::encode(tx))))
    }
}

#[derive(Default)]
struct AttestationState {
    polls: HashMap<Hash, u32>,
    outage: bool,
}

/// In-process attestation service backed by a simulated source chain.
pub struct SimulatedAttestationService {
    chain: Arc<SimulatedSourceChain>,
    attesters: Vec<AttesterKey>,
    pending_polls: u32,
    state: Mutex<AttestationState>,
}

impl SimulatedAttestationService {
    /// Service that answers pending `pending_polls` times per burn before
    /// attesting with every key.
    pub fn new(
        chain: Arc<SimulatedSourceChain>,
        attesters: Vec<AttesterKey>,
        pending_polls: u32,
    ) -> Self {
        Self {
            chain,
            attesters,
            pending_polls,
            state: Mutex::new(AttestationState::default()),
        }
    }

    /// Addresses the service signs as.
    pub fn attester_addresses(&self) -> Vec<EthAddress> {
        self.attesters.iter().map(AttesterKey::address).collect()
    }

    /// Make every poll fail, or recover.
    pub fn set_outage(&self, outage: bool) {
        self.state.lock().outage = outage;
    }

    /// Polls seen for a burn.
    pub fn polls_for(&self, burn_id: &Hash) -> u32 {
        self.state.lock().polls.get(burn_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl AttestationService for SimulatedAttestationService {
    async fn fetch_attestation(&self, burn_id: &Hash) -> Result<AttestationStatus, BridgeError> {
        let polls = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let polls = state.polls.entry(*burn_id).or_insert(0);
            *polls += 1;
            if state.outage {
                return Err(BridgeError::Attestation("HTTP 503 Service Unavailable".into()));
            }
            *polls
        };

        if self.chain.message_for(burn_id).is_none() || polls <= self.pending_polls {
            return Ok(AttestationStatus::Pending);
        }
        let mut attestation = Vec::with_capacity(self.attesters.len() * 65);
        for key in &self.attesters {
            let signature = key
                .sign_prehash(burn_id)
                .map_err(|e| BridgeError::Attestation(e.to_string()))?;
            attestation.extend_from_slice(&signature);
        }
        Ok(AttestationStatus::Complete(attestation))
    }
}
