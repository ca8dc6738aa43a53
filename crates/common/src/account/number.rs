use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::{verify_signature, KeyError, PUBLIC_KEY_SIZE};
use crate::encoding::base58::{self, Base58Error, CHECKSUM_SIZE};
use crate::network::Network;

const PUBKEY_MASK: u8 = 0x01;
const TESTNET_MASK: u8 = 0x01 << 1;
const ALGORITHM_SHIFT: u8 = 4;

/// Key variant byte ++ public key
pub const ACCOUNT_BYTES_SIZE: usize = 1 + PUBLIC_KEY_SIZE;
/// Decoded size of an account number including its checksum
pub const ACCOUNT_NUMBER_SIZE: usize = ACCOUNT_BYTES_SIZE + CHECKSUM_SIZE;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccountNumberError {
    #[error("invalid account number: {0}")]
    Base58(Base58Error),
    #[error("invalid account number checksum")]
    InvalidChecksum,
    #[error("invalid account number length: {0} bytes")]
    InvalidLength(usize),
    #[error("account number is not a public key variant: {0:#04x}")]
    NotPublicKey(u8),
    #[error("signature does not match account number: {0}")]
    Signature(KeyError),
    #[error("malformed {0} encoding")]
    Malformed(&'static str),
}

impl From<Base58Error> for AccountNumberError {
    fn from(e: Base58Error) -> Self {
        match e {
            Base58Error::InvalidChecksum => AccountNumberError::InvalidChecksum,
            other => AccountNumberError::Base58(other),
        }
    }
}

/// Public identity of an account
///
/// `base58(key_variant ++ ed25519_public_key ++ checksum)` where the variant
/// byte is `algorithm << 4 | 0x01`, plus `0x02` on testnet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber {
    encoded: String,
    network: Network,
    algorithm: u8,
    public_key: [u8; PUBLIC_KEY_SIZE],
}

impl AccountNumber {
    pub fn from_public_key(
        network: Network,
        algorithm: u8,
        public_key: [u8; PUBLIC_KEY_SIZE],
    ) -> Self {
        let mut key_variant = (algorithm << ALGORITHM_SHIFT) | PUBKEY_MASK;
        if network.is_testnet() {
            key_variant |= TESTNET_MASK;
        }
        let mut buffer = Vec::with_capacity(ACCOUNT_BYTES_SIZE);
        buffer.push(key_variant);
        buffer.extend_from_slice(&public_key);

        Self {
            encoded: base58::encode_check(&buffer),
            network,
            algorithm,
            public_key,
        }
    }

    /// Parse and checksum-verify an account number
    pub fn parse(number: &str) -> Result<Self, AccountNumberError> {
        let raw = base58::decode(number)?;
        if raw.len() != ACCOUNT_NUMBER_SIZE {
            return Err(AccountNumberError::InvalidLength(raw.len()));
        }
        let data = base58::verify_check(&raw)?;

        let key_variant = data[0];
        if key_variant & PUBKEY_MASK == 0 {
            return Err(AccountNumberError::NotPublicKey(key_variant));
        }
        let network = if key_variant & TESTNET_MASK != 0 {
            Network::Testnet
        } else {
            Network::Livenet
        };
        let mut public_key = [0u8; PUBLIC_KEY_SIZE];
        public_key.copy_from_slice(&data[1..]);

        Ok(Self {
            encoded: number.to_string(),
            network,
            algorithm: key_variant >> ALGORITHM_SHIFT,
            public_key,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Variant byte ++ public key, the form packed into signed records
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(ACCOUNT_BYTES_SIZE);
        let mut key_variant = (self.algorithm << ALGORITHM_SHIFT) | PUBKEY_MASK;
        if self.network.is_testnet() {
            key_variant |= TESTNET_MASK;
        }
        buffer.push(key_variant);
        buffer.extend_from_slice(&self.public_key);
        buffer
    }

    /// Check a detached signature made by this account
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), AccountNumberError> {
        verify_signature(&self.public_key, message, signature)
            .map_err(AccountNumberError::Signature)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for AccountNumber {
    type Err = AccountNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = AccountNumberError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.encoded
    }
}
