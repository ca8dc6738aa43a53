use clap::Args;

use common::access::AccessError;
use common::account::{AccountNumber, AccountNumberError};
use common::record::{RecordError, TransferRecord};

use crate::api::ApiError;
use crate::op::Op;
use crate::ops::{access_control, load_account, LoadAccountError};

/// Hand a bitmark to a new owner, passing the data key along first
#[derive(Args, Debug, Clone)]
pub struct Transfer {
    /// Account number of the current owner
    pub account_number: String,

    pub bitmark_id: String,

    /// Account number of the new owner
    pub new_owner: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error("invalid account number: {0}")]
    InvalidNumber(#[from] AccountNumberError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for Transfer {
    type Error = TransferError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, account) = load_account(ctx, &self.account_number).await?;
        let new_owner = AccountNumber::parse(&self.new_owner)?;
        let client = ctx.client(&state)?;

        // session data has to reach the receiver while we still own the bitmark
        let rekeyed = access_control(&client, &account)
            .rekey_for_transfer(&account, &self.bitmark_id, &new_owner)
            .await?;

        let bitmark = client.bitmark(&self.bitmark_id).await?;
        let mut record = TransferRecord::direct(&bitmark.head_id, new_owner.clone());
        record.sign(&account)?;
        let tx_id = client.transfer(&record).await?;
        tracing::info!(bitmark_id = %self.bitmark_id, %new_owner, %tx_id, "transferred bitmark");

        Ok(format!(
            "Transferred bitmark {} to {}\n - Transaction: {}\n - Session data: {}",
            self.bitmark_id,
            new_owner,
            tx_id,
            if rekeyed.is_some() { "sent" } else { "none (public asset)" }
        ))
    }
}
