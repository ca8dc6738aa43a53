use clap::Args;

use common::access::KeyLookup;
use common::account::{AccountNumber, AccountNumberError};
use common::request_auth::EncryptionKeyRegistration;

use crate::api::ApiError;
use crate::op::Op;
use crate::ops::{load_account, LoadAccountError};
use crate::state::StateError;

crate::command_enum! {
    (Register, Register),
    (Lookup, Lookup),
}

pub type KeyCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Key {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[async_trait::async_trait]
impl Op for Key {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Args, Debug, Clone)]
pub struct Register {
    /// Account number of a stored account
    pub account_number: String,

    /// Print the registration payload without sending it
    #[arg(long)]
    pub print_only: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl Op for Register {
    type Error = RegisterError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, account) = load_account(ctx, &self.account_number).await?;

        if self.print_only {
            let registration = EncryptionKeyRegistration::new(&account);
            return Ok(serde_json::to_string_pretty(&registration)?);
        }

        ctx.client(&state)?.register_encryption_key(&account).await?;
        Ok(format!(
            "Registered encryption key for {}",
            account.account_number()
        ))
    }
}

#[derive(Args, Debug, Clone)]
pub struct Lookup {
    /// Account number whose encryption key to fetch
    pub account_number: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid account number: {0}")]
    InvalidNumber(#[from] AccountNumberError),
    #[error("key lookup failed: {0}")]
    Lookup(#[from] anyhow::Error),
}

#[async_trait::async_trait]
impl Op for Lookup {
    type Error = LookupError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let number = AccountNumber::parse(&self.account_number)?;
        let keys = ctx.client(&state)?;
        let key = keys.encryption_public_key(&number).await?;
        Ok(hex::encode(key))
    }
}
