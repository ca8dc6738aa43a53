//! Account identity
//!
//! An [`Account`] is a seed plus the two keys derived from it. Everything
//! else (account number, seed string, recovery phrase) is recomputed from
//! those on demand, so two accounts built from the same seed are
//! indistinguishable.

mod number;
mod store;

pub use number::{AccountNumber, AccountNumberError, ACCOUNT_BYTES_SIZE, ACCOUNT_NUMBER_SIZE};
pub use store::{AccountStore, StoredSeed, StoredSeedError};

use crate::crypto::{
    derive_keys, AuthKey, EncrKey, KeyError, Seed, SeedError, SeedVersion, Signature,
    SEED_V1_SIZE,
};
use crate::encoding::mnemonic::{split_phrase, Language, MnemonicError};
use crate::network::Network;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
    #[error(transparent)]
    AccountNumber(#[from] AccountNumberError),
    #[error("tried to recover {recovered} account but the config is set to {configured}")]
    NetworkMismatch {
        recovered: Network,
        configured: Network,
    },
}

#[derive(Debug, Clone)]
pub struct Account {
    seed: Seed,
    auth_key: AuthKey,
    encr_key: EncrKey,
}

impl Account {
    /// Create an account from a fresh V2 seed
    pub fn new(network: Network) -> Result<Self, AccountError> {
        let account = Self::from_seed_value(Seed::generate(network)?)?;
        tracing::info!(
            account_number = %account.account_number(),
            %network,
            "created account"
        );
        Ok(account)
    }

    /// Build an account around an already parsed seed
    pub fn from_seed_value(seed: Seed) -> Result<Self, AccountError> {
        let (auth_key, encr_key) = derive_keys(&seed)?;
        Ok(Self {
            seed,
            auth_key,
            encr_key,
        })
    }

    /// Recover from a Base58 seed string on the configured network
    pub fn from_seed(encoded: &str, network: Network) -> Result<Self, AccountError> {
        let seed = Seed::from_base58(encoded, network)?;
        check_network(&seed, network)?;
        let account = Self::from_seed_value(seed)?;
        tracing::debug!(account_number = %account.account_number(), "recovered account from seed");
        Ok(account)
    }

    /// Recover from a 24-word (V1) or 12-word (V2) recovery phrase
    pub fn from_recovery_phrase<S: AsRef<str>>(
        words: &[S],
        language: Language,
        network: Network,
    ) -> Result<Self, AccountError> {
        let seed = Seed::from_recovery_phrase(words, language, network)?;
        check_network(&seed, network)?;
        let account = Self::from_seed_value(seed)?;
        tracing::debug!(account_number = %account.account_number(), "recovered account from phrase");
        Ok(account)
    }

    /// Same as [`Account::from_recovery_phrase`] for a space separated phrase
    pub fn from_phrase_str(
        phrase: &str,
        language: Language,
        network: Network,
    ) -> Result<Self, AccountError> {
        Self::from_recovery_phrase(&split_phrase(phrase), language, network)
    }

    /// Lift a bare V1 core onto `network`
    pub fn from_core(network: Network, core: [u8; SEED_V1_SIZE]) -> Result<Self, AccountError> {
        Self::from_seed_value(Seed::v1(network, core))
    }

    pub fn version(&self) -> SeedVersion {
        self.seed.version()
    }

    pub fn network(&self) -> Network {
        self.seed.network()
    }

    pub fn seed(&self) -> String {
        self.seed.to_base58()
    }

    pub fn seed_value(&self) -> &Seed {
        &self.seed
    }

    pub fn recovery_phrase(&self, language: Language) -> Result<Vec<String>, AccountError> {
        Ok(self.seed.recovery_phrase(language)?)
    }

    pub fn account_number(&self) -> AccountNumber {
        AccountNumber::from_public_key(
            self.network(),
            self.auth_key.algorithm(),
            self.auth_key.public_key_bytes(),
        )
    }

    pub fn auth_key(&self) -> &AuthKey {
        &self.auth_key
    }

    pub fn encr_key(&self) -> &EncrKey {
        &self.encr_key
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.auth_key.sign(message)
    }
}

fn check_network(seed: &Seed, configured: Network) -> Result<(), AccountError> {
    let recovered = seed.network();
    if recovered != configured {
        return Err(AccountError::NetworkMismatch {
            recovered,
            configured,
        });
    }
    Ok(())
}
