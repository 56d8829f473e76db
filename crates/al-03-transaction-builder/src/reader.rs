//! # Ledger Reader
//!
//! Read path over "fetch account by address": every record is located by
//! deriving its address, then decoded from the account bytes. Enumerating
//! pools needs the externally known id list.

use crate::domain::{AccountData, BuilderError};
use crate::ports::outbound::AccountFetcher;
use al_01_address_derivation::AddressDeriver;
use al_02_settlement::{decode_account, AccountRecord, GlobalConfig, NgoRecord, Pool};
use serde::{Deserialize, Serialize};
use shared_types::{Lamports, PoolId, Pubkey};
use tracing::warn;

/// Pool ids the deployed ledger is known to hold.
pub const KNOWN_POOL_IDS: [PoolId; 3] = [0, 1, 2];

/// A pool record with its account address and balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccount {
    /// Decoded record.
    pub pool: Pool,
    /// Account address.
    pub address: Pubkey,
    /// Native balance held.
    pub balance: Lamports,
}

/// Decodes ledger records fetched through an [`AccountFetcher`].
pub struct LedgerReader<F> {
    fetcher: F,
    deriver: AddressDeriver,
}

impl<F: AccountFetcher> LedgerReader<F> {
    /// Reader for the program behind `deriver`.
    pub fn new(fetcher: F, deriver: AddressDeriver) -> Self {
        Self { fetcher, deriver }
    }

    /// Underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn record<T: AccountRecord>(&self, address: &Pubkey) -> Result<Option<T>, BuilderError> {
        match self.fetcher.fetch_account(address).await? {
            Some(account) => Ok(Some(decode_owned(&self.deriver, &account)?)),
            None => Ok(None),
        }
    }

    /// Configuration singleton.
    pub async fn get_config(&self) -> Result<Option<GlobalConfig>, BuilderError> {
        let address = self.deriver.config()?.address;
        self.record(&address).await
    }

    /// Pool by id, with balance.
    pub async fn get_pool(&self, id: PoolId) -> Result<Option<PoolAccount>, BuilderError> {
        let address = self.deriver.pool(id)?.address;
        let Some(account) = self.fetcher.fetch_account(&address).await? else {
            return Ok(None);
        };
        Ok(Some(PoolAccount {
            pool: decode_owned(&self.deriver, &account)?,
            address,
            balance: account.lamports,
        }))
    }

    /// NGO record by wallet.
    pub async fn get_ngo(&self, wallet: &Pubkey) -> Result<Option<NgoRecord>, BuilderError> {
        let address = self.deriver.ngo(wallet)?.address;
        self.record(&address).await
    }

    /// Pools for `ids` in one batched fetch, in order, skipping missing or
    /// undecodable accounts.
    pub async fn get_pools(&self, ids: &[PoolId]) -> Result<Vec<PoolAccount>, BuilderError> {
        let addresses = ids
            .iter()
            .map(|id| Ok(self.deriver.pool(*id)?.address))
            .collect::<Result<Vec<_>, BuilderError>>()?;
        let accounts = self.fetcher.fetch_accounts(&addresses).await?;

        let mut out = Vec::with_capacity(ids.len());
        for ((id, address), account) in ids.iter().zip(addresses).zip(accounts) {
            let Some(account) = account else { continue };
            match decode_owned::<Pool>(&self.deriver, &account) {
                Ok(pool) => out.push(PoolAccount {
                    pool,
                    address,
                    balance: account.lamports,
                }),
                Err(e) => warn!("[al-03] Skipping pool {} at {}: {}", id, address, e),
            }
        }
        Ok(out)
    }

    /// The NGO's record and the existing pools it may withdraw from.
    pub async fn pools_for_ngo(
        &self,
        wallet: &Pubkey,
    ) -> Result<Option<(NgoRecord, Vec<PoolAccount>)>, BuilderError> {
        let Some(ngo) = self.get_ngo(wallet).await? else {
            return Ok(None);
        };
        let pools = self.get_pools(&ngo.allowed_pools).await?;
        Ok(Some((ngo, pools)))
    }

    /// Native balance of a pool account; zero if it does not exist.
    pub async fn pool_balance(&self, id: PoolId) -> Result<Lamports, BuilderError> {
        let address = self.deriver.pool(id)?.address;
        Ok(self
            .fetcher
            .fetch_account(&address)
            .await?
            .map(|a| a.lamports)
            .unwrap_or(0))
    }
}

fn decode_owned<T: AccountRecord>(
    deriver: &AddressDeriver,
    account: &AccountData,
) -> Result<T, BuilderError> {
    if account.owner != deriver.program_id() {
        return Err(BuilderError::Codec(format!(
            "account owned by {}, expected {}",
            account.owner,
            deriver.program_id()
        )));
    }
    Ok(decode_account(&account.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_02_settlement::encode_account;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<Pubkey, AccountData>);

    #[async_trait]
    impl AccountFetcher for MapFetcher {
        async fn fetch_account(
            &self,
            address: &Pubkey,
        ) -> Result<Option<AccountData>, BuilderError> {
            Ok(self.0.get(address).cloned())
        }

        async fn fetch_accounts(
            &self,
            addresses: &[Pubkey],
        ) -> Result<Vec<Option<AccountData>>, BuilderError> {
            Ok(addresses.iter().map(|a| self.0.get(a).cloned()).collect())
        }
    }

    fn reader_with_pools(pools: &[(Pool, Lamports)]) -> LedgerReader<MapFetcher> {
        let deriver = AddressDeriver::default();
        let mut map = HashMap::new();
        for (pool, balance) in pools {
            map.insert(
                deriver.pool(pool.id).unwrap().address,
                AccountData {
                    lamports: *balance,
                    data: encode_account(pool).unwrap(),
                    owner: deriver.program_id(),
                },
            );
        }
        LedgerReader::new(MapFetcher(map), deriver)
    }

    #[tokio::test]
    async fn test_get_pools_batches_and_skips_missing() {
        let reader = reader_with_pools(&[
            (Pool::new(0, "Ukraine Humanitarian Fund", 255), 2_000),
            (Pool::new(2, "Sudan Displacement Support", 254), 0),
        ]);
        let pools = reader.get_pools(&KNOWN_POOL_IDS).await.unwrap();
        let ids: Vec<_> = pools.iter().map(|p| p.pool.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(pools[0].balance, 2_000);
        assert_eq!(reader.pool_balance(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_foreign_owner_rejected() {
        let deriver = AddressDeriver::default();
        let pool = Pool::new(0, "Ukraine", 255);
        let mut map = HashMap::new();
        map.insert(
            deriver.pool(0).unwrap().address,
            AccountData {
                lamports: 1,
                data: encode_account(&pool).unwrap(),
                owner: Pubkey::new([3u8; 32]),
            },
        );
        let reader = LedgerReader::new(MapFetcher(map), deriver);
        assert!(matches!(
            reader.get_pool(0).await,
            Err(BuilderError::Codec(_))
        ));
        assert!(reader.get_pools(&[0]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_ngo_is_none() {
        let reader = reader_with_pools(&[]);
        assert!(reader
            .pools_for_ngo(&Pubkey::new([1u8; 32]))
            .await
            .unwrap()
            .is_none());
    }
}
