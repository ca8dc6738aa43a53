use clap::Args;

use common::account::{Account, AccountError, AccountStore};
use common::encoding::Language;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Recover {
    /// Base58 seed string
    #[arg(long, conflicts_with = "phrase")]
    pub seed: Option<String>,

    /// Space separated 12 or 24 word recovery phrase
    #[arg(long)]
    pub phrase: Option<String>,

    /// Language of the recovery phrase (en or zh-tw)
    #[arg(long, default_value = "en")]
    pub language: Language,
}

#[derive(Debug, thiserror::Error)]
pub enum RecoverError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("account store error: {0}")]
    Store(#[from] anyhow::Error),
    #[error("either --seed or --phrase is required")]
    MissingInput,
}

#[async_trait::async_trait]
impl crate::op::Op for Recover {
    type Error = RecoverError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let network = state.config.network;
        let account = match (&self.seed, &self.phrase) {
            (Some(seed), _) => Account::from_seed(seed, network)?,
            (None, Some(phrase)) => Account::from_phrase_str(phrase, self.language, network)?,
            (None, None) => return Err(RecoverError::MissingInput),
        };
        ctx.accounts(&state).put(&account).await?;

        Ok(format!(
            "Recovered {} account {}",
            account.version(),
            account.account_number()
        ))
    }
}
