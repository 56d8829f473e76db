//! Local keypair wallet, for the dev runtime and tests.

use crate::domain::{BuilderError, SignedTransaction, UnsignedTransaction};
use crate::ports::outbound::WalletSigner;
use async_trait::async_trait;
use shared_crypto::WalletKeypair;
use shared_types::Pubkey;
use tracing::debug;

/// Signs with an in-process Ed25519 keypair.
#[derive(Debug)]
pub struct KeypairSigner {
    keypair: WalletKeypair,
}

impl KeypairSigner {
    /// Wrap a keypair.
    pub fn new(keypair: WalletKeypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl WalletSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        tx: UnsignedTransaction,
    ) -> Result<SignedTransaction, BuilderError> {
        let me = self.keypair.pubkey();
        match tx.message.signers() {
            [only] if *only == me => {}
            [first, ..] => {
                return Err(BuilderError::SignerMismatch {
                    expected: *first,
                    got: me,
                })
            }
            [] => return Err(BuilderError::Malformed("message has no signers".into())),
        }
        debug!("[al-03] Signing {} as {}", tx.intent, me);
        let signature = self.keypair.sign(&tx.message_bytes());
        tx.into_signed(vec![signature])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransactionBuilder;
    use crate::domain::{Intent, LivenessAnchor};

    fn anchor() -> LivenessAnchor {
        LivenessAnchor {
            blockhash: [2u8; 32],
            last_valid_block_height: 10,
        }
    }

    #[tokio::test]
    async fn test_signs_and_round_trips_wire_bytes() {
        let signer = KeypairSigner::new(WalletKeypair::from_seed([7u8; 32]));
        let tx = TransactionBuilder::default()
            .build(
                &Intent::Donate {
                    donor: signer.pubkey(),
                    pool_id: 1,
                    amount: 5,
                },
                anchor(),
            )
            .unwrap();
        let signed = signer.sign_transaction(tx).await.unwrap();
        signed.verify().unwrap();

        let decoded = SignedTransaction::deserialize(&signed.serialize()).unwrap();
        assert_eq!(decoded, signed);
        decoded.verify().unwrap();
    }

    #[tokio::test]
    async fn test_refuses_foreign_message() {
        let signer = KeypairSigner::new(WalletKeypair::from_seed([7u8; 32]));
        let tx = TransactionBuilder::default()
            .build(
                &Intent::Donate {
                    donor: Pubkey::new([1u8; 32]),
                    pool_id: 1,
                    amount: 5,
                },
                anchor(),
            )
            .unwrap();
        assert!(matches!(
            signer.sign_transaction(tx).await,
            Err(BuilderError::SignerMismatch { .. })
        ));
    }
}
