use std::fmt;

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

/// Size of a data key in bytes
pub const DATA_KEY_SIZE: usize = 32;
/// Size of the ChaCha20-Poly1305 nonce; always zero for data keys
pub const NONCE_SIZE: usize = 12;
/// Identifier carried in session data
pub const ALG_CHACHA20_POLY1305: &str = "chacha20poly1305";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataKeyError {
    #[error("invalid data key size, expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
    #[error("unsupported data key algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("encrypt error")]
    Encrypt,
    #[error("decrypt error")]
    Decrypt,
    #[error("failed to generate random bytes: {0}")]
    Random(String),
}

fn zero_nonce() -> Nonce {
    *Nonce::from_slice(&[0u8; NONCE_SIZE])
}

/// A fresh content key for exactly one asset file
///
/// Data keys encrypt under a fixed zero nonce, so a key must never seal two
/// payloads. [`DataKey::encrypt`] consumes the key and hands back a
/// [`UsedDataKey`], which can still decrypt and be wrapped into session
/// data but cannot encrypt again.
pub struct DataKey([u8; DATA_KEY_SIZE]);

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey(..)")
    }
}

impl DataKey {
    pub fn generate() -> Result<Self, DataKeyError> {
        let mut buff = [0u8; DATA_KEY_SIZE];
        getrandom::getrandom(&mut buff).map_err(|e| DataKeyError::Random(e.to_string()))?;
        Ok(Self(buff))
    }

    pub fn from_bytes(bytes: [u8; DATA_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn algorithm(&self) -> &'static str {
        ALG_CHACHA20_POLY1305
    }

    /// Seal `plaintext` under the zero nonce
    ///
    /// Output: `ciphertext || tag (16)`.
    pub fn encrypt(self, plaintext: &[u8]) -> Result<(Vec<u8>, UsedDataKey), DataKeyError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.0));
        let ciphertext = cipher
            .encrypt(&zero_nonce(), plaintext)
            .map_err(|_| DataKeyError::Encrypt)?;
        Ok((ciphertext, UsedDataKey(self.0)))
    }
}

/// A data key that has already sealed its payload
#[derive(Clone, PartialEq, Eq)]
pub struct UsedDataKey([u8; DATA_KEY_SIZE]);

impl fmt::Debug for UsedDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UsedDataKey(..)")
    }
}

impl UsedDataKey {
    /// Rebuild a key recovered from session data
    pub fn from_slice(bytes: &[u8], algorithm: &str) -> Result<Self, DataKeyError> {
        if algorithm != ALG_CHACHA20_POLY1305 {
            return Err(DataKeyError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let buff: [u8; DATA_KEY_SIZE] =
            bytes.try_into().map_err(|_| DataKeyError::InvalidSize {
                expected: DATA_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(buff))
    }

    pub fn algorithm(&self) -> &'static str {
        ALG_CHACHA20_POLY1305
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DataKeyError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.0));
        cipher
            .decrypt(&zero_nonce(), ciphertext)
            .map_err(|_| DataKeyError::Decrypt)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_vector() {
        let key = DataKey::from_bytes([0u8; DATA_KEY_SIZE]);
        let (ciphertext, used) = key.encrypt(b"Hello, world!").unwrap();
        assert_eq!(
            hex::encode(&ciphertext),
            "d7628bd23a7d180df7c8fb1852c2cfc31d101d6a629b2c50edf6b9751a"
        );
        assert_eq!(used.decrypt(&ciphertext).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_zero_nonce_width() {
        assert_eq!(zero_nonce().len(), NONCE_SIZE);
        assert!(zero_nonce().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let (mut ciphertext, used) = DataKey::generate().unwrap().encrypt(b"payload").unwrap();
        ciphertext[0] ^= 0x01;
        assert_eq!(used.decrypt(&ciphertext), Err(DataKeyError::Decrypt));
    }

    #[test]
    fn test_rebuild_from_slice() {
        let (ciphertext, used) = DataKey::generate().unwrap().encrypt(b"payload").unwrap();
        let rebuilt = UsedDataKey::from_slice(used.bytes(), ALG_CHACHA20_POLY1305).unwrap();
        assert_eq!(rebuilt.decrypt(&ciphertext).unwrap(), b"payload");

        assert_eq!(
            UsedDataKey::from_slice(&[0u8; 16], ALG_CHACHA20_POLY1305),
            Err(DataKeyError::InvalidSize {
                expected: 32,
                actual: 16
            })
        );
        assert!(matches!(
            UsedDataKey::from_slice(used.bytes(), "aes-256-gcm"),
            Err(DataKeyError::UnsupportedAlgorithm(_))
        ));
    }
}
