use chrono::Duration;
use clap::Args;

use common::access::AccessError;
use common::account::{AccountNumber, AccountNumberError};

use crate::op::Op;
use crate::ops::{access_control, load_account, LoadAccountError};

/// Let another account read a private asset for a while
#[derive(Args, Debug, Clone)]
pub struct Lease {
    /// Account number of the owner
    pub account_number: String,

    pub bitmark_id: String,

    /// Account number of the lessee
    pub lessee: String,

    /// Lease length in days
    #[arg(long, default_value_t = 30)]
    pub days: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum LeaseError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error("invalid account number: {0}")]
    InvalidNumber(#[from] AccountNumberError),
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("bitmark {0} is public, there is nothing to lease")]
    PublicAsset(String),
}

#[async_trait::async_trait]
impl Op for Lease {
    type Error = LeaseError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, account) = load_account(ctx, &self.account_number).await?;
        let lessee = AccountNumber::parse(&self.lessee)?;
        let duration = Duration::try_days(self.days).ok_or(AccessError::InvalidLeaseDuration)?;
        let client = ctx.client(&state)?;

        access_control(&client, &account)
            .grant_lease(&account, &self.bitmark_id, &lessee, duration)
            .await?
            .ok_or_else(|| LeaseError::PublicAsset(self.bitmark_id.clone()))?;

        Ok(format!(
            "Leased bitmark {} to {} for {} day(s)",
            self.bitmark_id, lessee, self.days
        ))
    }
}
