use clap::Args;

use common::request_auth::{sign_request, sign_request_at};

use crate::ops::{load_account, LoadAccountError};

#[derive(Args, Debug, Clone)]
pub struct SignRequest {
    /// Account number of a stored account
    pub account_number: String,

    /// Action name, e.g. downloadAsset
    pub action: String,

    /// Extra message parts, in order
    pub parts: Vec<String>,

    /// Fixed timestamp in unix milliseconds (defaults to now)
    #[arg(long)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SignRequestError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
}

#[async_trait::async_trait]
impl crate::op::Op for SignRequest {
    type Error = SignRequestError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, account) = load_account(ctx, &self.account_number).await?;
        let parts: Vec<&str> = self.parts.iter().map(String::as_str).collect();
        let signed = match self.timestamp {
            Some(timestamp) => sign_request_at(&account, &self.action, &parts, timestamp),
            None => sign_request(&account, &self.action, &parts),
        };

        Ok(signed
            .headers()
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
