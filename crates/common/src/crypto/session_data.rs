use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::data_key::{DataKeyError, UsedDataKey};
use super::keys::{EncrKey, KeyError, PUBLIC_KEY_SIZE};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The box did not open: wrong keys or tampered ciphertext
    #[error("session data not for the recipient")]
    SessionKeyInvalid,
    #[error("data key encryption failed: {0}")]
    Encrypt(KeyError),
    #[error("invalid data key: {0}")]
    DataKey(#[from] DataKeyError),
    #[error("invalid encrypted data key hex: {0}")]
    Hex(String),
}

/// A data key boxed for exactly one recipient
///
/// The sender's encryption private key and the recipient's encryption public
/// key seal it; only the recipient's private key together with the sender's
/// public key opens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    encrypted_data_key: Vec<u8>,
    data_key_algorithm: String,
}

#[derive(Serialize, Deserialize)]
struct EncodedSessionData {
    enc_data_key: String,
    data_key_alg: String,
}

impl Serialize for SessionData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EncodedSessionData {
            enc_data_key: hex::encode(&self.encrypted_data_key),
            data_key_alg: self.data_key_algorithm.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SessionData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = EncodedSessionData::deserialize(deserializer)?;
        let encrypted_data_key =
            hex::decode(&encoded.enc_data_key).map_err(serde::de::Error::custom)?;
        Ok(Self {
            encrypted_data_key,
            data_key_algorithm: encoded.data_key_alg,
        })
    }
}

impl SessionData {
    /// Box `data_key` from `sender` to the holder of `recipient_public_key`
    pub fn create(
        sender: &EncrKey,
        data_key: &UsedDataKey,
        recipient_public_key: &[u8; PUBLIC_KEY_SIZE],
    ) -> Result<Self, SessionError> {
        let encrypted_data_key = sender
            .encrypt(data_key.bytes(), recipient_public_key)
            .map_err(SessionError::Encrypt)?;
        Ok(Self {
            encrypted_data_key,
            data_key_algorithm: data_key.algorithm().to_string(),
        })
    }

    /// Recover the data key as `recipient`, given the sender's public key
    ///
    /// Any failure to open is reported as [`SessionError::SessionKeyInvalid`];
    /// callers must not retry with other keys.
    pub fn open(
        &self,
        recipient: &EncrKey,
        sender_public_key: &[u8; PUBLIC_KEY_SIZE],
    ) -> Result<UsedDataKey, SessionError> {
        let bytes = recipient
            .decrypt(&self.encrypted_data_key, sender_public_key)
            .map_err(|_| SessionError::SessionKeyInvalid)?;
        Ok(UsedDataKey::from_slice(&bytes, &self.data_key_algorithm)?)
    }

    pub fn encrypted_data_key(&self) -> &[u8] {
        &self.encrypted_data_key
    }

    pub fn data_key_algorithm(&self) -> &str {
        &self.data_key_algorithm
    }

    pub fn from_parts(encrypted_data_key: &str, data_key_algorithm: &str) -> Result<Self, SessionError> {
        let encrypted_data_key =
            hex::decode(encrypted_data_key).map_err(|e| SessionError::Hex(e.to_string()))?;
        Ok(Self {
            encrypted_data_key,
            data_key_algorithm: data_key_algorithm.to_string(),
        })
    }
}
