//! Signed ledger records
//!
//! Every record is signed over its packed form rather than its JSON:
//! `varint(tag)` followed by each field in declaration order. Strings and
//! byte fields are length-prefixed, account fields carry the variant byte
//! and public key without the checksum, nonces are bare varints, and an
//! absent escrow payment is a single zero byte.

pub mod asset;
pub mod issue;
pub mod transfer;

pub use asset::{asset_id, compute_fingerprint, Accessibility, RegistrationRecord};
pub use issue::{sign_batch, IssueRecord, NonceGenerator};
pub use transfer::{CountersignedTransferRecord, OfferAction, OfferResponse, TransferRecord};

use crate::account::AccountNumber;
use crate::encoding::varint;

pub const TAG_REGISTER: u64 = 2;
pub const TAG_ISSUE: u64 = 3;
pub const TAG_DIRECT_TRANSFER: u64 = 4;
pub const TAG_COUNTERSIGNED_TRANSFER: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid {0}")]
    InvalidField(&'static str),
    #[error("property name not set or exceeds the maximum length (64 Unicode characters)")]
    InvalidNameLength,
    #[error("property metadata exceeds the maximum length (2048 Unicode characters)")]
    InvalidMetadataLength,
    #[error("asset content is empty")]
    EmptyContent,
    #[error("record is not signed")]
    Unsigned,
}

/// Builds the canonical message of a record
pub struct Packer(Vec<u8>);

impl Packer {
    pub fn new(tag: u64) -> Self {
        Self(varint::encode(tag))
    }

    pub fn utf8(mut self, value: &str) -> Self {
        varint::append_bytes(&mut self.0, value.as_bytes());
        self
    }

    /// Hex string that must decode to exactly `size` bytes
    pub fn hex(mut self, name: &'static str, value: &str, size: usize) -> Result<Self, RecordError> {
        let bytes = hex::decode(value).map_err(|_| RecordError::InvalidField(name))?;
        if bytes.len() != size {
            return Err(RecordError::InvalidField(name));
        }
        varint::append_bytes(&mut self.0, &bytes);
        Ok(self)
    }

    pub fn account(mut self, value: &AccountNumber) -> Self {
        varint::append_bytes(&mut self.0, &value.to_bytes());
        self
    }

    /// Escrow payments are not supported; always packed as absent
    pub fn no_payment(mut self) -> Self {
        self.0.push(0x00);
        self
    }

    pub fn uint64(mut self, value: u64) -> Self {
        varint::append(&mut self.0, value);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packer_layout() {
        let packed = Packer::new(TAG_ISSUE)
            .utf8("ab")
            .hex("link", "0102", 2)
            .unwrap()
            .no_payment()
            .uint64(300)
            .finish();
        assert_eq!(packed, vec![0x03, 0x02, b'a', b'b', 0x02, 0x01, 0x02, 0x00, 0xac, 0x02]);
    }

    #[test]
    fn test_packer_rejects_bad_hex() {
        assert!(matches!(
            Packer::new(TAG_DIRECT_TRANSFER).hex("link", "zz", 1),
            Err(RecordError::InvalidField("link"))
        ));
        assert!(matches!(
            Packer::new(TAG_DIRECT_TRANSFER).hex("link", "0102", 32),
            Err(RecordError::InvalidField("link"))
        ));
    }
}
