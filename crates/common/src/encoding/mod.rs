//! Wire encodings shared by seeds, account numbers and signed records
//!
//! - [`varint`]: little-endian base-128 integers and length-prefixed byte strings
//! - [`base58`]: Bitcoin-alphabet Base58 with a truncated SHA3-256 checksum
//! - [`mnemonic`]: 11-bit word phrases for 24-word (V1) and 12-word (V2) seeds

pub mod base58;
pub mod mnemonic;
pub mod varint;

pub use base58::{Base58Error, CHECKSUM_SIZE};
pub use mnemonic::{Language, MnemonicError};
