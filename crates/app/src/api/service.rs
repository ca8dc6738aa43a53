use async_trait::async_trait;

use common::access::{AccessGrant, ContentStore, SessionStore, StoredContent};
use common::account::{Account, AccountNumber};

use super::ApiClient;

/// Asset file and session storage reached through the API as one account
///
/// Every request is signed by `account`, so session data can only be read
/// for that account.
#[derive(Debug, Clone)]
pub struct AccountService {
    client: ApiClient,
    account: Account,
}

impl AccountService {
    pub fn new(client: ApiClient, account: Account) -> Self {
        Self { client, account }
    }
}

#[async_trait]
impl ContentStore for AccountService {
    async fn upload(&self, asset_id: &str, content: StoredContent) -> anyhow::Result<()> {
        Ok(self
            .client
            .upload_asset(&self.account, asset_id, content)
            .await?)
    }

    async fn download(&self, asset_id: &str) -> anyhow::Result<Option<StoredContent>> {
        Ok(self.client.asset_file(asset_id).await?)
    }
}

#[async_trait]
impl SessionStore for AccountService {
    async fn put(
        &self,
        bitmark_id: &str,
        recipient: &AccountNumber,
        grant: AccessGrant,
    ) -> anyhow::Result<()> {
        Ok(self
            .client
            .add_session(&self.account, bitmark_id, recipient, &grant)
            .await?)
    }

    async fn current(
        &self,
        bitmark_id: &str,
        holder: &AccountNumber,
    ) -> anyhow::Result<Option<AccessGrant>> {
        let requester = self.account.account_number();
        if holder != &requester {
            anyhow::bail!("session data of {} can only be read by that account", holder);
        }
        Ok(self.client.asset_access(&self.account, bitmark_id).await?)
    }
}
