use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use common::account::{Account, AccountNumber, AccountStore, StoredSeed};
use common::network::Network;

/// Account store backed by a JSON object of account number -> stored seed
#[derive(Debug)]
pub struct FileAccountStore {
    path: PathBuf,
    network: Network,
    lock: Mutex<()>,
}

impl FileAccountStore {
    pub fn new(path: impl AsRef<Path>, network: Network) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            network,
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> anyhow::Result<BTreeMap<String, StoredSeed>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) if json.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, entries: &BTreeMap<String, StoredSeed>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FileAccountStore {
    async fn put(&self, account: &Account) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        entries.insert(
            account.account_number().to_string(),
            StoredSeed::from_account(account),
        );
        self.write(&entries).await?;
        tracing::debug!(account_number = %account.account_number(), path = %self.path.display(), "stored account");
        Ok(())
    }

    async fn get(&self, account_number: &AccountNumber) -> anyhow::Result<Option<Account>> {
        let _guard = self.lock.lock().await;
        let entries = self.read().await?;
        let Some(stored) = entries.get(account_number.as_str()) else {
            return Ok(None);
        };
        let account = stored.to_account(self.network)?;
        if account.account_number() != *account_number {
            anyhow::bail!("stored seed for {} derives another account", account_number);
        }
        Ok(Some(account))
    }

    async fn list(&self) -> anyhow::Result<Vec<AccountNumber>> {
        let _guard = self.lock.lock().await;
        self.read()
            .await?
            .keys()
            .map(|number| AccountNumber::parse(number).map_err(anyhow::Error::from))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_put_get_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAccountStore::new(dir.path().join("accounts.json"), Network::Testnet);
        assert!(store.list().await.unwrap().is_empty());

        let account = Account::new(Network::Testnet).unwrap();
        store.put(&account).await.unwrap();

        let loaded = store.get(&account.account_number()).await.unwrap().unwrap();
        assert_eq!(loaded.seed(), account.seed());
        assert_eq!(store.list().await.unwrap(), vec![account.account_number()]);
    }

    #[tokio::test]
    async fn test_reads_legacy_core() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let core = [7u8; 32];
        let account = Account::from_core(Network::Livenet, core).unwrap();

        let mut entries = BTreeMap::new();
        entries.insert(
            account.account_number().to_string(),
            StoredSeed::from_raw(&core).unwrap(),
        );
        std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

        let store = FileAccountStore::new(&path, Network::Livenet);
        let loaded = store.get(&account.account_number()).await.unwrap().unwrap();
        assert_eq!(loaded.seed(), account.seed());
    }
}
