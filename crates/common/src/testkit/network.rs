use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};

use super::memory::{MemoryContentStore, MemoryKeyService, MemoryRegistry, MemorySessionStore};
use super::party::TestParty;
use crate::access::{AccessControl, AssetFile, Registry};
use crate::account::Account;
use crate::network::Network;
use crate::record::{sign_batch, IssueRecord, NonceGenerator, TransferRecord};

pub type MemoryAccessControl =
    AccessControl<MemoryRegistry, MemoryKeyService, MemoryContentStore, MemorySessionStore>;

/// A ledger, key service, content store and session store in one process
///
/// Parties added here have their encryption keys registered, so every
/// flow can run between them without further setup.
pub struct TestNetwork {
    network: Network,
    registry: MemoryRegistry,
    keys: MemoryKeyService,
    content: MemoryContentStore,
    sessions: MemorySessionStore,
    nonces: NonceGenerator,
    parties: HashMap<String, TestParty>,
}

impl TestNetwork {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            registry: MemoryRegistry::new(),
            keys: MemoryKeyService::new(),
            content: MemoryContentStore::new(),
            sessions: MemorySessionStore::new(),
            nonces: NonceGenerator::new(),
            parties: HashMap::new(),
        }
    }

    /// Create a party with a fresh account and register its encryption key
    pub fn add_party(&mut self, name: impl Into<String>) -> Result<TestParty> {
        let party = TestParty::new(name, self.network)?;
        self.insert(party)
    }

    /// Add a party around an existing account
    pub fn add_account(&mut self, name: impl Into<String>, account: Account) -> Result<TestParty> {
        self.insert(TestParty::from_account(name, account))
    }

    fn insert(&mut self, party: TestParty) -> Result<TestParty> {
        if self.parties.contains_key(party.name()) {
            return Err(anyhow!("Party '{}' already exists", party.name()));
        }
        self.keys.register_account(party.account())?;
        tracing::debug!(name = party.name(), account_number = %party.account_number(), "added party");
        self.parties.insert(party.name().to_string(), party.clone());
        Ok(party)
    }

    pub fn party(&self, name: &str) -> Option<&TestParty> {
        self.parties.get(name)
    }

    pub fn access(&self) -> MemoryAccessControl {
        AccessControl::new(
            self.registry.clone(),
            self.keys.clone(),
            self.content.clone(),
            self.sessions.clone(),
        )
    }

    pub fn registry(&self) -> &MemoryRegistry {
        &self.registry
    }

    pub fn keys(&self) -> &MemoryKeyService {
        &self.keys
    }

    pub fn content(&self) -> &MemoryContentStore {
        &self.content
    }

    pub fn sessions(&self) -> &MemorySessionStore {
        &self.sessions
    }

    /// Register `file`, issue `quantity` bitmarks of it and publish it
    ///
    /// Returns the bitmark ids, all owned by `issuer`.
    pub async fn issue(
        &self,
        issuer: &TestParty,
        file: AssetFile,
        quantity: usize,
    ) -> Result<Vec<String>> {
        let record = issuer.register("asset", &file, &BTreeMap::new())?;
        let asset_id = self.registry.register_asset(&record)?;
        let confirmed = self.registry.asset_confirmed(&asset_id).await?;

        let mut issues = IssueRecord::batch(&asset_id, quantity, confirmed, &self.nonces);
        sign_batch(&mut issues, issuer.account())?;
        let bitmark_ids = issues
            .iter()
            .map(|issue| self.registry.issue(issue))
            .collect::<Result<Vec<_>>>()?;

        self.access()
            .publish(issuer.account(), &bitmark_ids, file)
            .await?;
        Ok(bitmark_ids)
    }

    /// Rekey a bitmark for `to`, then transfer it directly
    pub async fn transfer(&self, bitmark_id: &str, from: &TestParty, to: &TestParty) -> Result<()> {
        self.access()
            .rekey_for_transfer(from.account(), bitmark_id, &to.account_number())
            .await?;
        let head = self.registry.bitmark(bitmark_id).await?.head_id;
        let mut record = TransferRecord::direct(&head, to.account_number());
        record.sign(from.account())?;
        self.registry.transfer(bitmark_id, &record)
    }
}
