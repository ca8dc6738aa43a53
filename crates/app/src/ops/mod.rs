pub mod account;
pub mod asset;
pub mod download;
pub mod init;
pub mod issue;
pub mod key;
pub mod lease;
pub mod sign_request;
pub mod transfer;
pub mod version;

pub use account::Account;
pub use asset::Asset;
pub use download::Download;
pub use init::Init;
pub use issue::Issue;
pub use key::Key;
pub use lease::Lease;
pub use sign_request::SignRequest;
pub use transfer::Transfer;
pub use version::Version;

use common::access::AccessControl;
use common::account::{Account as BitmarkAccount, AccountNumber, AccountNumberError, AccountStore};

use crate::api::{AccountService, ApiClient};
use crate::op::OpContext;
use crate::state::{AppState, StateError};

#[derive(Debug, thiserror::Error)]
pub enum LoadAccountError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid account number: {0}")]
    InvalidNumber(#[from] AccountNumberError),
    #[error("account store error: {0}")]
    Store(#[from] anyhow::Error),
    #[error("account {0} is not stored locally")]
    NotFound(String),
}

/// Load a locally stored account by account number
pub async fn load_account(
    ctx: &OpContext,
    account_number: &str,
) -> Result<(AppState, BitmarkAccount), LoadAccountError> {
    let state = ctx.state()?;
    let number = AccountNumber::parse(account_number)?;
    let account = ctx
        .accounts(&state)
        .get(&number)
        .await?
        .ok_or_else(|| LoadAccountError::NotFound(account_number.to_string()))?;
    Ok((state, account))
}

pub type ApiAccessControl = AccessControl<ApiClient, ApiClient, AccountService, AccountService>;

/// Access control over the API, acting as `account`
pub fn access_control(client: &ApiClient, account: &BitmarkAccount) -> ApiAccessControl {
    let service = AccountService::new(client.clone(), account.clone());
    AccessControl::new(client.clone(), client.clone(), service.clone(), service)
}
