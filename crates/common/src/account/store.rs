use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Account, AccountError, AccountNumber};
use crate::crypto::SEED_V1_SIZE;
use crate::network::Network;

#[derive(Debug, thiserror::Error)]
pub enum StoredSeedError {
    #[error("invalid stored core: {0}")]
    InvalidCore(String),
    #[error("stored seed is not utf-8")]
    NotUtf8,
    #[error(transparent)]
    Account(#[from] AccountError),
}

/// What a local store keeps for an account
///
/// New entries always hold the canonical seed string. Older deployments
/// stored the bare 32-byte V1 core, which only makes sense together with the
/// network the store is configured for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StoredSeed {
    Seed(String),
    LegacyCore(String),
}

impl StoredSeed {
    pub fn from_account(account: &Account) -> Self {
        StoredSeed::Seed(account.seed())
    }

    /// Interpret a raw stored value: 32 bytes is a V1 core, anything else
    ///  is a seed string
    pub fn from_raw(raw: &[u8]) -> Result<Self, StoredSeedError> {
        if raw.len() == SEED_V1_SIZE {
            return Ok(StoredSeed::LegacyCore(hex::encode(raw)));
        }
        let seed = std::str::from_utf8(raw).map_err(|_| StoredSeedError::NotUtf8)?;
        Ok(StoredSeed::Seed(seed.to_string()))
    }

    pub fn to_account(&self, network: Network) -> Result<Account, StoredSeedError> {
        match self {
            StoredSeed::Seed(seed) => Ok(Account::from_seed(seed, network)?),
            StoredSeed::LegacyCore(core_hex) => {
                let mut core = [0u8; SEED_V1_SIZE];
                hex::decode_to_slice(core_hex, &mut core)
                    .map_err(|e| StoredSeedError::InvalidCore(e.to_string()))?;
                Ok(Account::from_core(network, core)?)
            }
        }
    }
}

/// Local persistence of accounts, keyed by account number
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn put(&self, account: &Account) -> anyhow::Result<()>;

    /// Load an account; `None` when the number is not registered here
    async fn get(&self, account_number: &AccountNumber) -> anyhow::Result<Option<Account>>;

    async fn list(&self) -> anyhow::Result<Vec<AccountNumber>>;
}
