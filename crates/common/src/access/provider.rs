use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountNumber;
use crate::crypto::{SessionData, PUBLIC_KEY_SIZE};
use crate::record::Accessibility;

/// Ledger view of a bitmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmarkInfo {
    pub id: String,
    pub asset_id: String,
    pub issuer: AccountNumber,
    pub owner: AccountNumber,
    /// Latest transaction id, the link of the next transfer
    pub head_id: String,
}

/// Session data addressed to one holder, with the account that boxed it
///
/// A grant without an expiry is an ownership grant and only opens while the
/// holder owns the bitmark. A lease grant opens until it expires, whoever
/// the owner is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub sender: AccountNumber,
    pub session_data: SessionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_expires_at: Option<DateTime<Utc>>,
}

impl AccessGrant {
    pub fn ownership(sender: AccountNumber, session_data: SessionData) -> Self {
        Self {
            sender,
            session_data,
            lease_expires_at: None,
        }
    }

    pub fn lease(
        sender: AccountNumber,
        session_data: SessionData,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender,
            session_data,
            lease_expires_at: Some(expires_at),
        }
    }

    pub fn is_lease(&self) -> bool {
        self.lease_expires_at.is_some()
    }
}

/// Asset bytes as kept by the content store; ciphertext when private
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub filename: String,
    pub content: Vec<u8>,
    pub accessibility: Accessibility,
}

/// Lookup of registered encryption public keys
#[async_trait]
pub trait KeyLookup: Send + Sync {
    async fn encryption_public_key(
        &self,
        account_number: &AccountNumber,
    ) -> anyhow::Result<[u8; PUBLIC_KEY_SIZE]>;
}

/// Read side of the ledger
#[async_trait]
pub trait Registry: Send + Sync {
    async fn bitmark(&self, bitmark_id: &str) -> anyhow::Result<BitmarkInfo>;

    /// Whether the asset registration has been confirmed on chain
    async fn asset_confirmed(&self, asset_id: &str) -> anyhow::Result<bool>;
}

/// Storage of asset files keyed by asset id
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn upload(&self, asset_id: &str, content: StoredContent) -> anyhow::Result<()>;

    async fn download(&self, asset_id: &str) -> anyhow::Result<Option<StoredContent>>;

    async fn accessibility(&self, asset_id: &str) -> anyhow::Result<Option<Accessibility>> {
        Ok(self.download(asset_id).await?.map(|c| c.accessibility))
    }
}

/// Session data per (bitmark, holder)
///
/// Grants are appended, never replaced: the latest grant for a holder is
/// the current one, older ones stay as history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(
        &self,
        bitmark_id: &str,
        recipient: &AccountNumber,
        grant: AccessGrant,
    ) -> anyhow::Result<()>;

    async fn current(
        &self,
        bitmark_id: &str,
        holder: &AccountNumber,
    ) -> anyhow::Result<Option<AccessGrant>>;
}
