use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, bail};

use crate::access::{
    AccessGrant, BitmarkInfo, ContentStore, KeyLookup, Registry, SessionStore, StoredContent,
};
use crate::account::{Account, AccountNumber, AccountStore, StoredSeed};
use crate::crypto::PUBLIC_KEY_SIZE;
use crate::network::Network;
use crate::record::{CountersignedTransferRecord, IssueRecord, RegistrationRecord, TransferRecord};
use crate::request_auth::EncryptionKeyRegistration;

fn poisoned<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("memory store lock poisoned: {}", e)
}

/// In-memory ledger that checks record signatures and transfer links
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<RwLock<MemoryRegistryInner>>,
}

#[derive(Debug, Default)]
struct MemoryRegistryInner {
    assets: HashMap<String, RegistrationRecord>,
    confirmed: HashSet<String>,
    bitmarks: HashMap<String, BitmarkInfo>,
    next_tx: u64,
}

impl MemoryRegistryInner {
    fn tx_id(&mut self) -> String {
        self.next_tx += 1;
        format!("{:064x}", self.next_tx)
    }
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a signed registration; returns the asset id
    pub fn register_asset(&self, record: &RegistrationRecord) -> anyhow::Result<String> {
        record.verify()?;
        let asset_id = record.asset_id();
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.assets.insert(asset_id.clone(), record.clone());
        Ok(asset_id)
    }

    pub fn confirm_asset(&self, asset_id: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if !inner.assets.contains_key(asset_id) {
            bail!("unknown asset {}", asset_id);
        }
        inner.confirmed.insert(asset_id.to_string());
        Ok(())
    }

    /// Accept a signed issue; returns the new bitmark id
    pub fn issue(&self, record: &IssueRecord) -> anyhow::Result<String> {
        record.verify()?;
        let owner = record.owner.clone().ok_or_else(|| anyhow!("issue has no owner"))?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        if !inner.assets.contains_key(&record.asset_id) {
            bail!("issue for unknown asset {}", record.asset_id);
        }
        let id = inner.tx_id();
        inner.bitmarks.insert(
            id.clone(),
            BitmarkInfo {
                id: id.clone(),
                asset_id: record.asset_id.clone(),
                issuer: owner.clone(),
                owner,
                head_id: id.clone(),
            },
        );
        Ok(id)
    }

    /// Apply a direct transfer signed by the current owner
    pub fn transfer(&self, bitmark_id: &str, record: &TransferRecord) -> anyhow::Result<()> {
        if record.requires_countersignature() {
            bail!("offer for {} needs a countersignature", bitmark_id);
        }
        let mut inner = self.inner.write().map_err(poisoned)?;
        let current = inner
            .bitmarks
            .get(bitmark_id)
            .ok_or_else(|| anyhow!("unknown bitmark {}", bitmark_id))?;
        if current.head_id != record.link {
            bail!("transfer link does not match head of {}", bitmark_id);
        }
        record.verify(&current.owner)?;
        let head_id = inner.tx_id();
        if let Some(bitmark) = inner.bitmarks.get_mut(bitmark_id) {
            bitmark.owner = record.owner.clone();
            bitmark.head_id = head_id;
        }
        Ok(())
    }

    /// Apply an offer accepted and countersigned by the receiver
    pub fn accept_offer(
        &self,
        bitmark_id: &str,
        record: &CountersignedTransferRecord,
    ) -> anyhow::Result<()> {
        record.verify_countersignature()?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        let current = inner
            .bitmarks
            .get(bitmark_id)
            .ok_or_else(|| anyhow!("unknown bitmark {}", bitmark_id))?;
        if current.head_id != record.link {
            bail!("offer link does not match head of {}", bitmark_id);
        }
        let head_id = inner.tx_id();
        if let Some(bitmark) = inner.bitmarks.get_mut(bitmark_id) {
            bitmark.owner = record.owner.clone();
            bitmark.head_id = head_id;
        }
        Ok(())
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn bitmark(&self, bitmark_id: &str) -> anyhow::Result<BitmarkInfo> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .bitmarks
            .get(bitmark_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown bitmark {}", bitmark_id))
    }

    async fn asset_confirmed(&self, asset_id: &str) -> anyhow::Result<bool> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.confirmed.contains(asset_id))
    }
}

/// In-memory key service; registrations are checked on the way in and out
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyService {
    inner: Arc<RwLock<HashMap<AccountNumber, EncryptionKeyRegistration>>>,
}

impl MemoryKeyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        account_number: &AccountNumber,
        registration: EncryptionKeyRegistration,
    ) -> anyhow::Result<()> {
        registration.verify(account_number)?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(account_number.clone(), registration);
        Ok(())
    }

    pub fn register_account(&self, account: &Account) -> anyhow::Result<()> {
        self.register(
            &account.account_number(),
            EncryptionKeyRegistration::new(account),
        )
    }
}

#[async_trait]
impl KeyLookup for MemoryKeyService {
    async fn encryption_public_key(
        &self,
        account_number: &AccountNumber,
    ) -> anyhow::Result<[u8; PUBLIC_KEY_SIZE]> {
        let inner = self.inner.read().map_err(poisoned)?;
        let registration = inner
            .get(account_number)
            .ok_or_else(|| anyhow!("no encryption key registered for {}", account_number))?;
        Ok(registration.verify(account_number)?)
    }
}

/// In-memory content store; uploads can be made to fail
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    inner: Arc<RwLock<MemoryContentStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryContentStoreInner {
    files: HashMap<String, StoredContent>,
    fail_uploads: bool,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) -> anyhow::Result<()> {
        self.inner.write().map_err(poisoned)?.fail_uploads = fail;
        Ok(())
    }

    /// Raw stored bytes, as an eavesdropper on the store would see them
    pub fn raw(&self, asset_id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.files.get(asset_id).map(|f| f.content.clone()))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn upload(&self, asset_id: &str, content: StoredContent) -> anyhow::Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.fail_uploads {
            bail!("content store unavailable");
        }
        inner.files.insert(asset_id.to_string(), content);
        Ok(())
    }

    async fn download(&self, asset_id: &str) -> anyhow::Result<Option<StoredContent>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.files.get(asset_id).cloned())
    }
}

/// In-memory session store keeping every grant ever made
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<RwLock<MemorySessionStoreInner>>,
}

#[derive(Debug, Default)]
struct MemorySessionStoreInner {
    grants: HashMap<(String, AccountNumber), Vec<AccessGrant>>,
    fail_puts: bool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts(&self, fail: bool) -> anyhow::Result<()> {
        self.inner.write().map_err(poisoned)?.fail_puts = fail;
        Ok(())
    }

    /// All grants made to `holder` on `bitmark_id`, oldest first
    pub fn history(
        &self,
        bitmark_id: &str,
        holder: &AccountNumber,
    ) -> anyhow::Result<Vec<AccessGrant>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .grants
            .get(&(bitmark_id.to_string(), holder.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(
        &self,
        bitmark_id: &str,
        recipient: &AccountNumber,
        grant: AccessGrant,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.fail_puts {
            bail!("session store unavailable");
        }
        inner
            .grants
            .entry((bitmark_id.to_string(), recipient.clone()))
            .or_default()
            .push(grant);
        Ok(())
    }

    async fn current(
        &self,
        bitmark_id: &str,
        holder: &AccountNumber,
    ) -> anyhow::Result<Option<AccessGrant>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .grants
            .get(&(bitmark_id.to_string(), holder.clone()))
            .and_then(|grants| grants.last().cloned()))
    }
}

/// In-memory account store bound to one network
#[derive(Debug, Clone)]
pub struct MemoryAccountStore {
    network: Network,
    inner: Arc<RwLock<HashMap<AccountNumber, StoredSeed>>>,
}

impl MemoryAccountStore {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            inner: Arc::default(),
        }
    }

    /// Store a raw seed value as an older deployment would have
    pub fn put_raw(&self, account_number: AccountNumber, raw: &[u8]) -> anyhow::Result<()> {
        let stored = StoredSeed::from_raw(raw)?;
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(account_number, stored);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn put(&self, account: &Account) -> anyhow::Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(account.account_number(), StoredSeed::from_account(account));
        Ok(())
    }

    async fn get(&self, account_number: &AccountNumber) -> anyhow::Result<Option<Account>> {
        let stored = {
            let inner = self.inner.read().map_err(poisoned)?;
            inner.get(account_number).cloned()
        };
        stored
            .map(|s| s.to_account(self.network).map_err(anyhow::Error::from))
            .transpose()
    }

    async fn list(&self) -> anyhow::Result<Vec<AccountNumber>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut numbers: Vec<_> = inner.keys().cloned().collect();
        numbers.sort();
        Ok(numbers)
    }
}
