use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Sha3};

use super::{Packer, RecordError, TAG_REGISTER};
use crate::account::{Account, AccountNumber};

const MIN_NAME_LENGTH: usize = 1;
const MAX_NAME_LENGTH: usize = 64;
const MAX_METADATA_LENGTH: usize = 2048;
const FINGERPRINT_VERSION: &str = "01";

/// Whether an asset file is stored encrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Public,
    Private,
}

fn sha3_512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha3::v512();
    let mut out = [0u8; 64];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// `"01" ++ hex(SHA3-512(content))`
pub fn compute_fingerprint(content: &[u8]) -> String {
    format!("{}{}", FINGERPRINT_VERSION, hex::encode(sha3_512(content)))
}

/// Asset id: `hex(SHA3-512(fingerprint))`
pub fn asset_id(fingerprint: &str) -> String {
    hex::encode(sha3_512(fingerprint.as_bytes()))
}

/// Join metadata as `k1\0v1\0k2\0v2`, dropping empty keys or values
fn compact_metadata(metadata: &BTreeMap<String, String>) -> String {
    metadata
        .iter()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .flat_map(|(k, v)| [k.as_str(), v.as_str()])
        .collect::<Vec<_>>()
        .join("\u{0}")
}

/// Asset registration: name, fingerprint, metadata, registrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub name: String,
    pub fingerprint: String,
    pub metadata: String,
    pub registrant: Option<AccountNumber>,
    pub signature: Option<String>,
}

impl RegistrationRecord {
    pub fn new(name: &str, metadata: &BTreeMap<String, String>) -> Result<Self, RecordError> {
        let name_length = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_length) {
            return Err(RecordError::InvalidNameLength);
        }
        let metadata = compact_metadata(metadata);
        if metadata.chars().count() > MAX_METADATA_LENGTH {
            return Err(RecordError::InvalidMetadataLength);
        }
        Ok(Self {
            name: name.to_string(),
            fingerprint: String::new(),
            metadata,
            registrant: None,
            signature: None,
        })
    }

    pub fn set_fingerprint(&mut self, content: &[u8]) -> Result<(), RecordError> {
        if content.is_empty() {
            return Err(RecordError::EmptyContent);
        }
        self.fingerprint = compute_fingerprint(content);
        Ok(())
    }

    pub fn asset_id(&self) -> String {
        asset_id(&self.fingerprint)
    }

    fn pack(&self, registrant: &AccountNumber) -> Vec<u8> {
        Packer::new(TAG_REGISTER)
            .utf8(&self.name)
            .utf8(&self.fingerprint)
            .utf8(&self.metadata)
            .account(registrant)
            .finish()
    }

    pub fn sign(&mut self, registrant: &Account) -> Result<(), RecordError> {
        if self.fingerprint.is_empty() {
            return Err(RecordError::InvalidField("fingerprint"));
        }
        let number = registrant.account_number();
        let signature = registrant.sign(&self.pack(&number));
        self.registrant = Some(number);
        self.signature = Some(hex::encode(signature));
        Ok(())
    }

    /// Check the signature against the embedded registrant
    pub fn verify(&self) -> Result<(), RecordError> {
        let (Some(registrant), Some(signature)) = (&self.registrant, &self.signature) else {
            return Err(RecordError::Unsigned);
        };
        let signature =
            hex::decode(signature).map_err(|_| RecordError::InvalidField("signature"))?;
        registrant
            .verify(&self.pack(registrant), &signature)
            .map_err(|_| RecordError::InvalidField("signature"))
    }
}
