//! Account key material and the asset access protocol
//!
//! # Key hierarchy
//!
//! A [`Seed`] deterministically yields two independent keys:
//! - [`AuthKey`]: Ed25519, signs records and requests and backs the account number
//! - [`EncrKey`]: Curve25519 box key, wraps per-asset data keys
//!
//! V1 seeds (32-byte core) derive each key by sealing a fixed counter block
//! with XSalsa20-Poly1305 keyed by the core under a zero nonce. V2 seeds
//! (17 bytes) are absorbed four times into SHAKE256; the first 32 squeezed
//! bytes are the auth entropy and the next 32 the encryption entropy.
//!
//! # Session data
//!
//! To protect an asset file:
//! 1. Generate a [`DataKey`] and seal the file with ChaCha20-Poly1305 (zero nonce)
//! 2. Box the key bytes with the owner's `EncrKey` for a recipient public key
//! 3. Publish the resulting [`SessionData`]
//!
//! A recipient opens the box with its own private key and the sender's
//! public key. On transfer the current holder opens its session data and
//! boxes the same key for the new owner; older session data is left intact.

mod data_key;
mod keys;
mod seed;
mod session_data;

pub use data_key::{DataKey, DataKeyError, UsedDataKey, ALG_CHACHA20_POLY1305, DATA_KEY_SIZE};
pub use keys::{
    derive_keys, verify_signature, AuthKey, EncrKey, KeyError, Signature, ALG_ED25519,
    ALG_NACL_BOX, PUBLIC_KEY_SIZE, SIGNATURE_SIZE,
};
pub use seed::{Seed, SeedError, SeedVersion, SEED_V1_SIZE, SEED_V2_SIZE};
pub use session_data::{SessionData, SessionError};
