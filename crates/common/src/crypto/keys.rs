use std::fmt;

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::AeadInPlace;
use crypto_box::SalsaBox;
use crypto_secretbox::aead::KeyInit;
use crypto_secretbox::XSalsa20Poly1305;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use tiny_keccak::{Hasher, Shake, Xof};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use super::seed::{Seed, SEED_V2_SIZE};

/// Algorithm id of Ed25519 authentication keys
pub const ALG_ED25519: u8 = 1;
/// Algorithm id of NaCl box encryption keys
pub const ALG_NACL_BOX: u8 = 2;

/// Size of the entropy each key is built from
pub const KEY_ENTROPY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 64;
/// NaCl box nonce size
pub const BOX_NONCE_SIZE: usize = 24;
/// Poly1305 tag size
pub const BOX_TAG_SIZE: usize = 16;

// V1 subkey derivation: secretbox(core) over two fixed counter blocks
const V1_SEED_NONCE: [u8; 24] = [0u8; 24];
const V1_AUTH_SEED_COUNT: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xe7,
];
const V1_ENCR_SEED_COUNT: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xe8,
];

// V2 seeds are absorbed this many times before squeezing
const V2_ABSORB_ROUNDS: usize = 4;

pub type Signature = [u8; SIGNATURE_SIZE];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid seed length")]
    InvalidSeedLength,
    #[error("invalid key entropy size: expected {expected}, got {actual}")]
    InvalidEntropySize { expected: usize, actual: usize },
    #[error("key derivation failed: {0}")]
    Derivation(String),
    #[error("ciphertext too short: {0} bytes")]
    CiphertextTooShort(usize),
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("failed to generate random bytes: {0}")]
    Random(String),
}

fn to_entropy(bytes: &[u8]) -> Result<[u8; KEY_ENTROPY_SIZE], KeyError> {
    bytes
        .try_into()
        .map_err(|_| KeyError::InvalidEntropySize {
            expected: KEY_ENTROPY_SIZE,
            actual: bytes.len(),
        })
}

/// Seal a fixed counter block under the V1 core; the 32-byte
///  `tag || ciphertext` output is the subkey entropy
fn v1_subkey(core: &[u8], counter: &[u8; 16]) -> Result<[u8; KEY_ENTROPY_SIZE], KeyError> {
    let cipher = XSalsa20Poly1305::new_from_slice(core)
        .map_err(|_| KeyError::InvalidSeedLength)?;
    let mut buffer = *counter;
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&V1_SEED_NONCE), b"", &mut buffer)
        .map_err(|_| KeyError::Derivation("secretbox seal failed".to_string()))?;

    let mut out = [0u8; KEY_ENTROPY_SIZE];
    out[..BOX_TAG_SIZE].copy_from_slice(tag.as_slice());
    out[BOX_TAG_SIZE..].copy_from_slice(&buffer);
    Ok(out)
}

/// Absorb the V2 seed four times into SHAKE256 and squeeze
///  two 32-byte outputs
fn v2_subkeys(seed: &[u8]) -> Result<([u8; KEY_ENTROPY_SIZE], [u8; KEY_ENTROPY_SIZE]), KeyError> {
    if seed.len() != SEED_V2_SIZE || seed[SEED_V2_SIZE - 1] & 0x0f != 0 {
        return Err(KeyError::InvalidSeedLength);
    }
    let mut shake = Shake::v256();
    for _ in 0..V2_ABSORB_ROUNDS {
        shake.update(seed);
    }
    let mut auth = [0u8; KEY_ENTROPY_SIZE];
    let mut encr = [0u8; KEY_ENTROPY_SIZE];
    shake.squeeze(&mut auth);
    shake.squeeze(&mut encr);
    Ok((auth, encr))
}

/// Derive the authentication and encryption keys of a seed
pub fn derive_keys(seed: &Seed) -> Result<(AuthKey, EncrKey), KeyError> {
    let (auth, encr) = match seed {
        Seed::V1 { core, .. } => (
            v1_subkey(core, &V1_AUTH_SEED_COUNT)?,
            v1_subkey(core, &V1_ENCR_SEED_COUNT)?,
        ),
        Seed::V2 { entropy, .. } => v2_subkeys(entropy)?,
    };
    Ok((AuthKey::from_entropy(&auth)?, EncrKey::from_entropy(&encr)?))
}

/// Ed25519 signing key of an account
#[derive(Clone)]
pub struct AuthKey(SigningKey);

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthKey")
            .field(&hex::encode(self.public_key_bytes()))
            .finish()
    }
}

impl AuthKey {
    /// Build the key using the entropy as the Ed25519 seed
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, KeyError> {
        Ok(Self(SigningKey::from_bytes(&to_entropy(entropy)?)))
    }

    pub fn algorithm(&self) -> u8 {
        ALG_ED25519
    }

    /// The 64-byte expanded form: seed ++ public key
    pub fn private_key_bytes(&self) -> [u8; 64] {
        self.0.to_keypair_bytes()
    }

    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.0.sign(message).to_bytes()
    }
}

/// Verify a detached Ed25519 signature against a raw public key
pub fn verify_signature(
    public_key: &[u8; PUBLIC_KEY_SIZE],
    message: &[u8],
    signature: &[u8],
) -> Result<(), KeyError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| KeyError::InvalidPublicKey)?;
    let signature =
        ed25519_dalek::Signature::from_slice(signature).map_err(|_| KeyError::InvalidSignature)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| KeyError::InvalidSignature)
}

/// Curve25519 box key of an account
///
/// The private key is the raw entropy; the public key is its clamped
/// scalar multiple of the base point.
#[derive(Clone)]
pub struct EncrKey {
    private: [u8; KEY_ENTROPY_SIZE],
    public: [u8; PUBLIC_KEY_SIZE],
}

impl fmt::Debug for EncrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncrKey")
            .field(&hex::encode(self.public))
            .finish()
    }
}

impl EncrKey {
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, KeyError> {
        let private = to_entropy(entropy)?;
        let public = X25519PublicKey::from(&StaticSecret::from(private)).to_bytes();
        Ok(Self { private, public })
    }

    pub fn algorithm(&self) -> u8 {
        ALG_NACL_BOX
    }

    pub fn private_key_bytes(&self) -> [u8; KEY_ENTROPY_SIZE] {
        self.private
    }

    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public
    }

    fn salsa_box(&self, peer_public_key: &[u8; PUBLIC_KEY_SIZE]) -> SalsaBox {
        let peer = crypto_box::PublicKey::from(*peer_public_key);
        let secret = crypto_box::SecretKey::from(self.private);
        SalsaBox::new(&peer, &secret)
    }

    /// Box `plaintext` for the holder of `peer_public_key`
    ///
    /// Output: `nonce (24) || tag (16) || ciphertext`, with a random nonce.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        peer_public_key: &[u8; PUBLIC_KEY_SIZE],
    ) -> Result<Vec<u8>, KeyError> {
        let mut nonce = [0u8; BOX_NONCE_SIZE];
        getrandom::getrandom(&mut nonce).map_err(|e| KeyError::Random(e.to_string()))?;

        let mut buffer = plaintext.to_vec();
        let tag = self
            .salsa_box(peer_public_key)
            .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
            .map_err(|_| KeyError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(BOX_NONCE_SIZE + BOX_TAG_SIZE + buffer.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(tag.as_slice());
        out.extend_from_slice(&buffer);
        Ok(out)
    }

    /// Open a box sealed by the holder of `peer_public_key`
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        peer_public_key: &[u8; PUBLIC_KEY_SIZE],
    ) -> Result<Vec<u8>, KeyError> {
        if ciphertext.len() < BOX_NONCE_SIZE + BOX_TAG_SIZE {
            return Err(KeyError::CiphertextTooShort(ciphertext.len()));
        }
        let (nonce, rest) = ciphertext.split_at(BOX_NONCE_SIZE);
        let (tag, sealed) = rest.split_at(BOX_TAG_SIZE);

        let mut buffer = sealed.to_vec();
        self.salsa_box(peer_public_key)
            .decrypt_in_place_detached(
                GenericArray::from_slice(nonce),
                b"",
                &mut buffer,
                GenericArray::from_slice(tag),
            )
            .map_err(|_| KeyError::DecryptionFailed)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_derivation_is_deterministic() {
        let mut entropy = [0x42u8; SEED_V2_SIZE];
        entropy[16] = 0x40;
        let seed = Seed::v2(Network::Testnet, &entropy).unwrap();
        let (auth_a, encr_a) = derive_keys(&seed).unwrap();
        let (auth_b, encr_b) = derive_keys(&seed).unwrap();
        assert_eq!(auth_a.private_key_bytes(), auth_b.private_key_bytes());
        assert_eq!(encr_a.private_key_bytes(), encr_b.private_key_bytes());
        assert_ne!(auth_a.public_key_bytes(), encr_a.public_key_bytes());
    }

    #[test]
    fn test_v1_subkeys_differ() {
        let seed = Seed::v1(Network::Livenet, [7u8; 32]);
        let (auth, encr) = derive_keys(&seed).unwrap();
        assert_ne!(auth.private_key_bytes()[..32], encr.private_key_bytes()[..]);
    }

    #[test]
    fn test_v2_rejects_bad_seed() {
        assert_eq!(v2_subkeys(&[0u8; 16]), Err(KeyError::InvalidSeedLength));
        let mut seed = [0u8; SEED_V2_SIZE];
        seed[16] = 0x0f;
        assert_eq!(v2_subkeys(&seed), Err(KeyError::InvalidSeedLength));
    }

    #[test]
    fn test_public_key_recoverable_from_private() {
        let key = AuthKey::from_entropy(&[9u8; 32]).unwrap();
        let private = key.private_key_bytes();
        assert_eq!(&private[32..], &key.public_key_bytes()[..]);
    }

    #[test]
    fn test_sign_and_verify() {
        let key = AuthKey::from_entropy(&[1u8; 32]).unwrap();
        let signature = key.sign(b"hello");
        verify_signature(&key.public_key_bytes(), b"hello", &signature).unwrap();
        assert_eq!(
            verify_signature(&key.public_key_bytes(), b"hullo", &signature),
            Err(KeyError::InvalidSignature)
        );
    }

    #[test]
    fn test_box_round_trip() {
        let alice = EncrKey::from_entropy(&[1u8; 32]).unwrap();
        let bob = EncrKey::from_entropy(&[2u8; 32]).unwrap();
        let eve = EncrKey::from_entropy(&[3u8; 32]).unwrap();

        let sealed = alice.encrypt(b"data key", &bob.public_key_bytes()).unwrap();
        assert_eq!(sealed.len(), BOX_NONCE_SIZE + BOX_TAG_SIZE + 8);
        assert_eq!(
            bob.decrypt(&sealed, &alice.public_key_bytes()).unwrap(),
            b"data key"
        );
        assert_eq!(
            eve.decrypt(&sealed, &alice.public_key_bytes()),
            Err(KeyError::DecryptionFailed)
        );
    }

    #[test]
    fn test_box_too_short() {
        let key = EncrKey::from_entropy(&[1u8; 32]).unwrap();
        assert_eq!(
            key.decrypt(&[0u8; 10], &key.public_key_bytes()),
            Err(KeyError::CiphertextTooShort(10))
        );
    }
}
