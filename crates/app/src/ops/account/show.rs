use clap::Args;

use common::account::AccountError;
use common::encoding::Language;

use crate::ops::{load_account, LoadAccountError};

#[derive(Args, Debug, Clone)]
pub struct Show {
    /// Account number of a stored account
    pub account_number: String,

    /// Language of the printed recovery phrase (en or zh-tw)
    #[arg(long, default_value = "en")]
    pub language: Language,
}

#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error(transparent)]
    Account(#[from] AccountError),
}

#[async_trait::async_trait]
impl crate::op::Op for Show {
    type Error = ShowError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, account) = load_account(ctx, &self.account_number).await?;
        let phrase = account.recovery_phrase(self.language)?;

        Ok(format!(
            "Account {}\n\
             - Network: {}\n\
             - Seed version: {}\n\
             - Seed: {}\n\
             - Recovery phrase: {}\n\
             - Encryption public key: {}",
            account.account_number(),
            account.network(),
            account.version(),
            account.seed(),
            phrase.join(" "),
            hex::encode(account.encr_key().public_key_bytes()),
        ))
    }
}
