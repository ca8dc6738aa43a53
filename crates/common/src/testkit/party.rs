use crate::access::AssetFile;
use crate::account::{Account, AccountNumber};
use crate::network::Network;
use crate::record::{Accessibility, RegistrationRecord};

use std::collections::BTreeMap;

/// A named account taking part in a test scenario
#[derive(Debug, Clone)]
pub struct TestParty {
    name: String,
    account: Account,
}

impl TestParty {
    pub fn new(name: impl Into<String>, network: Network) -> anyhow::Result<Self> {
        Ok(Self {
            name: name.into(),
            account: Account::new(network)?,
        })
    }

    pub fn from_account(name: impl Into<String>, account: Account) -> Self {
        Self {
            name: name.into(),
            account,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_number(&self) -> AccountNumber {
        self.account.account_number()
    }

    /// Signed registration of `file` under `name`
    pub fn register(
        &self,
        name: &str,
        file: &AssetFile,
        metadata: &BTreeMap<String, String>,
    ) -> anyhow::Result<RegistrationRecord> {
        let mut record = RegistrationRecord::new(name, metadata)?;
        record.set_fingerprint(&file.content)?;
        record.sign(&self.account)?;
        Ok(record)
    }

    /// A private file named after this party
    pub fn private_file(&self, content: &[u8]) -> AssetFile {
        AssetFile::new(
            &format!("{}.txt", self.name),
            content.to_vec(),
            Accessibility::Private,
        )
    }
}
