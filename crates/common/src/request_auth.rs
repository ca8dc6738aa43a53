//! Authentication of privileged requests
//!
//! The signed message is `action|part|...|account_number|timestamp_ms`,
//! signed with the account's auth key and sent as three headers. Skew
//! windows and replay rejection are left to the receiving service.

use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountNumber, AccountNumberError};
use crate::crypto::PUBLIC_KEY_SIZE;

pub const HEADER_REQUESTER: &str = "requester";
pub const HEADER_TIMESTAMP: &str = "timestamp";
pub const HEADER_SIGNATURE: &str = "signature";

/// The three authentication headers of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub requester: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignedRequest {
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            (HEADER_REQUESTER, self.requester.as_str()),
            (HEADER_TIMESTAMP, self.timestamp.as_str()),
            (HEADER_SIGNATURE, self.signature.as_str()),
        ]
    }

    /// Check the signature for `action` and `parts` against the requester
    pub fn verify(&self, action: &str, parts: &[&str]) -> Result<(), AccountNumberError> {
        let requester = AccountNumber::parse(&self.requester)?;
        let message = request_message(action, parts, &self.requester, &self.timestamp);
        let signature = hex::decode(&self.signature)
            .map_err(|_| AccountNumberError::Malformed("signature"))?;
        requester.verify(message.as_bytes(), &signature)
    }
}

/// `join("|", action, parts..., account_number, timestamp)`
pub fn request_message(action: &str, parts: &[&str], account_number: &str, timestamp: &str) -> String {
    let mut fields = Vec::with_capacity(parts.len() + 3);
    fields.push(action);
    fields.extend_from_slice(parts);
    fields.push(account_number);
    fields.push(timestamp);
    fields.join("|")
}

/// Sign a request at the current time
pub fn sign_request(account: &Account, action: &str, parts: &[&str]) -> SignedRequest {
    sign_request_at(account, action, parts, chrono::Utc::now().timestamp_millis())
}

pub fn sign_request_at(
    account: &Account,
    action: &str,
    parts: &[&str],
    timestamp_millis: i64,
) -> SignedRequest {
    let requester = account.account_number().to_string();
    let timestamp = timestamp_millis.to_string();
    let message = request_message(action, parts, &requester, &timestamp);
    tracing::debug!(%requester, action, "signing request");
    SignedRequest {
        signature: hex::encode(account.sign(message.as_bytes())),
        requester,
        timestamp,
    }
}

/// Binding of an account's encryption key to its account number
///
/// Registered with the key service so counterparts can look up the box key
/// and check it against the account number alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionKeyRegistration {
    pub encryption_pubkey: String,
    pub signature: String,
}

impl EncryptionKeyRegistration {
    pub fn new(account: &Account) -> Self {
        let public_key = account.encr_key().public_key_bytes();
        Self {
            encryption_pubkey: hex::encode(public_key),
            signature: hex::encode(account.sign(&public_key)),
        }
    }

    /// Verify the binding and return the raw encryption public key
    pub fn verify(
        &self,
        account_number: &AccountNumber,
    ) -> Result<[u8; PUBLIC_KEY_SIZE], AccountNumberError> {
        let mut public_key = [0u8; PUBLIC_KEY_SIZE];
        hex::decode_to_slice(&self.encryption_pubkey, &mut public_key)
            .map_err(|_| AccountNumberError::Malformed("encryption public key"))?;
        let signature = hex::decode(&self.signature)
            .map_err(|_| AccountNumberError::Malformed("signature"))?;
        account_number.verify(&public_key, &signature)?;
        Ok(public_key)
    }
}
