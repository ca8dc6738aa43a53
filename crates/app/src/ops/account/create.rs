use clap::Args;

use common::account::{Account, AccountError, AccountStore};
use common::encoding::Language;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Language of the printed recovery phrase (en or zh-tw)
    #[arg(long, default_value = "en")]
    pub language: Language,

    /// Skip registering the encryption key with the key service
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("account store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let account = Account::new(state.config.network)?;
        let phrase = account.recovery_phrase(self.language)?;
        ctx.accounts(&state).put(&account).await?;

        // the account is stored either way; a failed registration can be retried
        let key_status = if self.offline {
            "not registered (offline)".to_string()
        } else {
            let registered = match ctx.client(&state) {
                Ok(client) => client.register_encryption_key(&account).await,
                Err(e) => Err(e),
            };
            match registered {
                Ok(()) => "registered".to_string(),
                Err(e) => {
                    tracing::warn!(account_number = %account.account_number(), error = %e, "encryption key registration failed");
                    format!(
                        "not registered ({}); run `bitmark key register {}`",
                        e,
                        account.account_number()
                    )
                }
            }
        };

        Ok(format!(
            "Created account {}\n\
             - Network: {}\n\
             - Seed: {}\n\
             - Recovery phrase: {}\n\
             - Encryption key: {}",
            account.account_number(),
            account.network(),
            account.seed(),
            phrase.join(" "),
            key_status,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::test_server::TestLedger;
    use crate::op::{Op, OpContext};
    use crate::state::{AppConfig, AppState};

    fn created_number(output: &str) -> String {
        output
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("Created account "))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_create_registers_encryption_key() {
        let ledger = TestLedger::start().await;
        let dir = tempfile::tempdir().unwrap();
        AppState::init(Some(dir.path().to_path_buf()), ledger.config()).unwrap();
        let ctx = OpContext::new(Some(dir.path().to_path_buf()));

        let create = Create {
            language: Language::English,
            offline: false,
        };
        let output = create.execute(&ctx).await.unwrap();
        assert!(output.contains("- Encryption key: registered"), "{output}");

        let number = created_number(&output);
        assert!(ledger.recorded().keys.contains_key(&number));
    }

    #[tokio::test]
    async fn test_create_offline_skips_registration() {
        let ledger = TestLedger::start().await;
        let dir = tempfile::tempdir().unwrap();
        AppState::init(Some(dir.path().to_path_buf()), ledger.config()).unwrap();
        let ctx = OpContext::new(Some(dir.path().to_path_buf()));

        let create = Create {
            language: Language::English,
            offline: true,
        };
        let output = create.execute(&ctx).await.unwrap();
        assert!(output.contains("not registered (offline)"));
        assert!(ledger.recorded().keys.is_empty());
    }

    #[tokio::test]
    async fn test_create_keeps_account_when_registration_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::for_network(common::network::Network::Testnet);
        // nothing listens on the discard port
        config.api_url = "http://127.0.0.1:9".to_string();
        let state = AppState::init(Some(dir.path().to_path_buf()), config).unwrap();
        let ctx = OpContext::new(Some(dir.path().to_path_buf()));

        let create = Create {
            language: Language::English,
            offline: false,
        };
        let output = create.execute(&ctx).await.unwrap();
        assert!(output.contains("run `bitmark key register"), "{output}");

        let number = common::account::AccountNumber::parse(&created_number(&output)).unwrap();
        assert!(ctx.accounts(&state).get(&number).await.unwrap().is_some());
    }
}
