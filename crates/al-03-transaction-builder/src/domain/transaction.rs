//! # Transactions
//!
//! Legacy primary-chain message and the signed envelope around it.
//!
//! ```text
//! transaction = shortvec(signatures) ++ signature[64]* ++ message
//! message     = header[3] ++ shortvec(keys) ++ key[32]* ++ blockhash[32]
//!               ++ shortvec(instructions) ++ compiled_instruction*
//! ```

use crate::algorithms::message::{decode_message, decode_transaction, encode_message, encode_transaction};
use crate::domain::entities::{LivenessAnchor, TxSignature};
use crate::domain::errors::BuilderError;
use serde::{Deserialize, Serialize};
use shared_crypto::{verify_ed25519, Ed25519Signature};
use shared_types::{AccountMeta, Hash, Instruction, Pubkey};

/// Signature and read-only counts that classify the account keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Leading keys that must sign.
    pub num_required_signatures: u8,
    /// Of the signers, how many (at the end) are read-only.
    pub num_readonly_signed_accounts: u8,
    /// Of the non-signers, how many (at the end) are read-only.
    pub num_readonly_unsigned_accounts: u8,
}

/// Instruction with accounts replaced by indexes into the key table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInstruction {
    /// Index of the program id.
    pub program_id_index: u8,
    /// Account indexes, in instruction order.
    pub accounts: Vec<u8>,
    /// Instruction data.
    pub data: Vec<u8>,
}

/// Legacy message: the bytes every signer signs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Key classification.
    pub header: MessageHeader,
    /// Writable signers, read-only signers, writable, read-only.
    pub account_keys: Vec<Pubkey>,
    /// Liveness anchor blockhash.
    pub recent_blockhash: Hash,
    /// Compiled instructions.
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Fee payer (first key).
    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// Keys that must sign, in signature order.
    pub fn signers(&self) -> &[Pubkey] {
        let n = usize::from(self.header.num_required_signatures).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    /// Whether key `index` is a signer.
    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header.num_required_signatures)
    }

    /// Whether key `index` is writable.
    pub fn is_writable(&self, index: usize) -> bool {
        let signers = usize::from(self.header.num_required_signatures);
        if index < signers {
            index < signers.saturating_sub(usize::from(self.header.num_readonly_signed_accounts))
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(usize::from(self.header.num_readonly_unsigned_accounts))
        }
    }

    /// Wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        encode_message(self)
    }

    /// Parse wire bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, BuilderError> {
        decode_message(bytes)
    }

    /// Expand compiled instructions back into account metas.
    pub fn decompile(&self) -> Result<Vec<Instruction>, BuilderError> {
        let key = |index: u8| -> Result<Pubkey, BuilderError> {
            self.account_keys
                .get(usize::from(index))
                .copied()
                .ok_or_else(|| BuilderError::Malformed(format!("account index {index} out of range")))
        };
        self.instructions
            .iter()
            .map(|ix| {
                let accounts = ix
                    .accounts
                    .iter()
                    .map(|&i| {
                        Ok(AccountMeta {
                            pubkey: key(i)?,
                            is_signer: self.is_signer(usize::from(i)),
                            is_writable: self.is_writable(usize::from(i)),
                        })
                    })
                    .collect::<Result<Vec<_>, BuilderError>>()?;
                Ok(Instruction {
                    program_id: key(ix.program_id_index)?,
                    accounts,
                    data: ix.data.clone(),
                })
            })
            .collect()
    }
}

/// A built, not yet signed, transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Intent name, for logs.
    pub intent: String,
    /// Message to sign.
    pub message: Message,
    /// Anchor the message was built against.
    pub anchor: LivenessAnchor,
}

impl UnsignedTransaction {
    /// Bytes the wallet signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        self.message.serialize()
    }

    /// Attach signatures in signer order.
    pub fn into_signed(
        self,
        signatures: Vec<Ed25519Signature>,
    ) -> Result<SignedTransaction, BuilderError> {
        let tx = SignedTransaction {
            signatures,
            message: self.message,
        };
        tx.verify()?;
        Ok(tx)
    }
}

/// Transaction with every required signature attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// One signature per required signer.
    pub signatures: Vec<Ed25519Signature>,
    /// Signed message.
    pub message: Message,
}

impl SignedTransaction {
    /// Transaction id (first signature).
    pub fn id(&self) -> Option<TxSignature> {
        self.signatures.first().copied().map(TxSignature::from)
    }

    /// Check the signature count and every signature.
    pub fn verify(&self) -> Result<(), BuilderError> {
        let signers = self.message.signers();
        if signers.len() != self.signatures.len() {
            return Err(BuilderError::Malformed(format!(
                "expected {} signatures, got {}",
                signers.len(),
                self.signatures.len()
            )));
        }
        let bytes = self.message.serialize();
        for (signer, signature) in signers.iter().zip(&self.signatures) {
            if verify_ed25519(signer, &bytes, signature).is_err() {
                return Err(BuilderError::InvalidSignature { signer: *signer });
            }
        }
        Ok(())
    }

    /// Wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        encode_transaction(self)
    }

    /// Parse wire bytes. Signatures are not verified.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, BuilderError> {
        decode_transaction(bytes)
    }
}
