//! # Transaction Builder
//!
//! Turns intents into exact unsigned operations. Account references come
//! from address derivation, the recent blockhash from a [`BlockhashProvider`].
//! Nothing here signs.

use crate::algorithms::abi::{encode_approve, encode_deposit_for_burn};
use crate::algorithms::message::{compile_message, PACKET_DATA_SIZE};
use crate::domain::{
    BridgeCalls, BridgeIntent, BuilderError, EvmCall, EvmNetwork, Intent, LivenessAnchor,
    UnsignedTransaction,
};
use crate::ports::outbound::BlockhashProvider;
use al_01_address_derivation::AddressDeriver;
use al_02_settlement::{LedgerInstruction, PRIMARY_CHAIN_DOMAIN};
use shared_types::{
    AccountMeta, Instruction, Pubkey, SYSTEM_PROGRAM_ID, SYSVAR_CLOCK_ID, SYSVAR_RENT_ID,
};
use tracing::debug;

/// Builds ledger transactions and bridge calls for one program deployment.
#[derive(Clone, Copy, Debug)]
pub struct TransactionBuilder {
    deriver: AddressDeriver,
    source: EvmNetwork,
    destination_domain: u32,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new(AddressDeriver::default())
    }
}

impl TransactionBuilder {
    /// Builder for the program behind `deriver`, bridging from Sepolia.
    pub fn new(deriver: AddressDeriver) -> Self {
        Self {
            deriver,
            source: EvmNetwork::sepolia(),
            destination_domain: PRIMARY_CHAIN_DOMAIN,
        }
    }

    /// Use another source chain.
    pub fn with_source(mut self, source: EvmNetwork) -> Self {
        self.source = source;
        self
    }

    /// Use another destination domain.
    pub fn with_destination_domain(mut self, domain: u32) -> Self {
        self.destination_domain = domain;
        self
    }

    /// Address deriver in use.
    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    /// Source chain parameters.
    pub fn source(&self) -> &EvmNetwork {
        &self.source
    }

    /// The single program instruction for an intent.
    pub fn instruction(&self, intent: &Intent) -> Result<Instruction, BuilderError> {
        intent.validate()?;
        let d = &self.deriver;
        let (accounts, data) = match intent {
            Intent::Initialize {
                admin,
                attesters,
                threshold,
                local_domain,
            } => (
                vec![
                    AccountMeta::new(*admin, true),
                    AccountMeta::new(d.config()?.address, false),
                    AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                ],
                LedgerInstruction::Initialize {
                    attesters: attesters.clone(),
                    threshold: *threshold,
                    local_domain: *local_domain,
                },
            ),
            Intent::CreatePool {
                admin,
                pool_id,
                name,
            } => (
                vec![
                    AccountMeta::new(*admin, true),
                    AccountMeta::new_readonly(d.config()?.address, false),
                    AccountMeta::new(d.pool(*pool_id)?.address, false),
                    AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                ],
                LedgerInstruction::CreatePool {
                    id: *pool_id,
                    name: name.clone(),
                },
            ),
            Intent::RegisterNgo {
                admin,
                wallet,
                allowed_pools,
                daily_limit,
            } => (
                vec![
                    AccountMeta::new(*admin, true),
                    AccountMeta::new_readonly(d.config()?.address, false),
                    AccountMeta::new_readonly(*wallet, false),
                    AccountMeta::new(d.ngo(wallet)?.address, false),
                    AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                ],
                LedgerInstruction::RegisterNgo {
                    allowed_pools: allowed_pools.clone(),
                    daily_limit: *daily_limit,
                },
            ),
            Intent::SetPoolActive {
                admin,
                pool_id,
                active,
            } => (
                vec![
                    AccountMeta::new(*admin, true),
                    AccountMeta::new_readonly(d.config()?.address, false),
                    AccountMeta::new(d.pool(*pool_id)?.address, false),
                ],
                LedgerInstruction::SetPoolActive { active: *active },
            ),
            Intent::Donate {
                donor,
                pool_id,
                amount,
            } => (
                vec![
                    AccountMeta::new(*donor, true),
                    AccountMeta::new(d.pool(*pool_id)?.address, false),
                    AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                ],
                LedgerInstruction::DonateToPool { amount: *amount },
            ),
            Intent::Withdraw {
                ngo_wallet,
                pool_id,
                amount,
            } => (
                vec![
                    AccountMeta::new(*ngo_wallet, true),
                    AccountMeta::new(d.ngo(ngo_wallet)?.address, false),
                    AccountMeta::new(d.pool(*pool_id)?.address, false),
                    AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                    AccountMeta::new_readonly(SYSVAR_CLOCK_ID, false),
                    AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
                ],
                LedgerInstruction::WithdrawFromPool { amount: *amount },
            ),
            Intent::CreditBridged {
                relayer,
                pool_id,
                message,
                attestation,
            } => (
                vec![
                    AccountMeta::new(*relayer, true),
                    AccountMeta::new(d.config()?.address, false),
                    AccountMeta::new(d.pool(*pool_id)?.address, false),
                    AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                ],
                LedgerInstruction::CreditBridgedDonation {
                    message: message.clone(),
                    attestation: attestation.clone(),
                },
            ),
        };
        Ok(Instruction {
            program_id: d.program_id(),
            accounts,
            data: data.encode()?,
        })
    }

    /// Unsigned transaction against a given anchor.
    pub fn build(
        &self,
        intent: &Intent,
        anchor: LivenessAnchor,
    ) -> Result<UnsignedTransaction, BuilderError> {
        let instruction = self.instruction(intent)?;
        let fee_payer = intent.fee_payer();
        let message = compile_message(&fee_payer, &[instruction], anchor.blockhash)?;

        let size = transaction_size(message.signers().len(), message.serialize().len());
        if size > PACKET_DATA_SIZE {
            return Err(BuilderError::MessageTooLarge(format!(
                "{size} bytes (max {PACKET_DATA_SIZE})"
            )));
        }
        debug!(
            "[al-03] Built {} for {} ({} bytes, valid until height {})",
            intent.name(),
            fee_payer,
            size,
            anchor.last_valid_block_height
        );
        Ok(UnsignedTransaction {
            intent: intent.name().to_string(),
            message,
            anchor,
        })
    }

    /// Unsigned transaction against a freshly fetched anchor.
    pub async fn build_fresh<B: BlockhashProvider + ?Sized>(
        &self,
        intent: &Intent,
        provider: &B,
    ) -> Result<UnsignedTransaction, BuilderError> {
        intent.validate()?;
        let anchor = provider.latest_anchor().await?;
        self.build(intent, anchor)
    }

    /// 32-byte mint recipient for a destination pool.
    pub fn mint_recipient(&self, pool_id: u64) -> Result<[u8; 32], BuilderError> {
        Ok(self.deriver.pool(pool_id)?.address.to_bytes())
    }

    /// Approve and burn calls for a bridge transfer.
    pub fn bridge_calls(&self, intent: &BridgeIntent) -> Result<BridgeCalls, BuilderError> {
        intent.validate()?;
        let mint_recipient = self.mint_recipient(intent.destination_pool)?;
        let approve = EvmCall {
            chain_id: self.source.chain_id,
            from: intent.owner,
            to: self.source.usdc,
            data: encode_approve(&self.source.token_messenger, intent.amount),
        };
        let burn = EvmCall {
            chain_id: self.source.chain_id,
            from: intent.owner,
            to: self.source.token_messenger,
            data: encode_deposit_for_burn(
                intent.amount,
                self.destination_domain,
                &mint_recipient,
                &self.source.usdc,
            ),
        };
        Ok(BridgeCalls {
            approve,
            burn,
            mint_recipient,
            destination_domain: self.destination_domain,
        })
    }

    /// Pool account address.
    pub fn pool_address(&self, pool_id: u64) -> Result<Pubkey, BuilderError> {
        Ok(self.deriver.pool(pool_id)?.address)
    }
}

fn transaction_size(signatures: usize, message_len: usize) -> usize {
    let mut prefix = Vec::with_capacity(3);
    crate::algorithms::message::encode_length(&mut prefix, signatures);
    prefix.len() + signatures * 64 + message_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_02_settlement::codec::instructions::DONATE_TO_POOL;

    fn anchor() -> LivenessAnchor {
        LivenessAnchor {
            blockhash: [9u8; 32],
            last_valid_block_height: 1_000,
        }
    }

    #[test]
    fn test_donate_message_layout() {
        let builder = TransactionBuilder::default();
        let donor = Pubkey::new([3u8; 32]);
        let tx = builder
            .build(
                &Intent::Donate {
                    donor,
                    pool_id: 0,
                    amount: 1_000,
                },
                anchor(),
            )
            .unwrap();

        let pool = builder.pool_address(0).unwrap();
        let program = builder.deriver().program_id();
        assert_eq!(
            tx.message.account_keys,
            vec![donor, pool, SYSTEM_PROGRAM_ID, program]
        );
        assert_eq!(tx.message.header.num_required_signatures, 1);
        assert_eq!(tx.message.recent_blockhash, [9u8; 32]);

        let data = &tx.message.instructions[0].data;
        assert_eq!(&data[..8], &DONATE_TO_POOL);
        assert_eq!(&data[8..], &1_000u64.to_le_bytes());
    }

    #[test]
    fn test_withdraw_accounts_in_program_order() {
        let builder = TransactionBuilder::default();
        let wallet = Pubkey::new([5u8; 32]);
        let ix = builder
            .instruction(&Intent::Withdraw {
                ngo_wallet: wallet,
                pool_id: 2,
                amount: 10,
            })
            .unwrap();
        let keys: Vec<_> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(
            keys,
            vec![
                wallet,
                builder.deriver().ngo(&wallet).unwrap().address,
                builder.pool_address(2).unwrap(),
                SYSTEM_PROGRAM_ID,
                SYSVAR_CLOCK_ID,
                SYSVAR_RENT_ID,
            ]
        );
        assert!(ix.accounts[0].is_signer);
        assert!(ix.accounts[1..].iter().all(|m| !m.is_signer));
    }

    #[test]
    fn test_invalid_intent_never_built() {
        let builder = TransactionBuilder::default();
        let result = builder.build(
            &Intent::Withdraw {
                ngo_wallet: Pubkey::new([5u8; 32]),
                pool_id: 0,
                amount: 0,
            },
            anchor(),
        );
        assert!(matches!(result, Err(BuilderError::InvalidIntent(_))));
    }

    #[test]
    fn test_bridge_calls_target_pool_address() {
        let builder = TransactionBuilder::default();
        let owner = shared_types::EthAddress([0x44; 20]);
        let calls = builder
            .bridge_calls(&BridgeIntent {
                owner,
                amount: 100,
                destination_pool: 0,
            })
            .unwrap();

        assert_eq!(calls.approve.to, builder.source().usdc);
        assert_eq!(calls.burn.to, builder.source().token_messenger);
        assert_eq!(calls.mint_recipient, builder.pool_address(0).unwrap().to_bytes());
        assert_eq!(&calls.burn.data[68..100], &calls.mint_recipient);
        assert_eq!(calls.burn.data[67], 5);
        assert_eq!(calls.destination_domain, PRIMARY_CHAIN_DOMAIN);
    }
}
