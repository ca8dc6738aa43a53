use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{Packer, RecordError, TAG_ISSUE};
use crate::account::{Account, AccountNumber};

const ASSET_ID_SIZE: usize = 64;

/// Issue nonces: `unix_seconds * 1000 + counter % 1000`
///
/// The counter lives in the generator, so independent generators never
/// share state.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    counter: AtomicU64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let seconds = chrono::Utc::now().timestamp().max(0) as u64;
        seconds * 1000 + index % 1000
    }
}

/// Issuance of one bitmark of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub asset_id: String,
    pub owner: Option<AccountNumber>,
    pub nonce: u64,
    pub signature: Option<String>,
}

impl IssueRecord {
    pub fn new(asset_id: &str, nonce: u64) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            owner: None,
            nonce,
            signature: None,
        }
    }

    /// Build `quantity` unsigned issues
    ///
    /// The first issue of an asset the ledger has not confirmed yet uses
    /// nonce zero; every other issue takes a fresh generator nonce.
    pub fn batch(
        asset_id: &str,
        quantity: usize,
        asset_confirmed: bool,
        nonces: &NonceGenerator,
    ) -> Vec<Self> {
        (0..quantity)
            .map(|i| {
                let nonce = if i == 0 && !asset_confirmed {
                    0
                } else {
                    nonces.next()
                };
                Self::new(asset_id, nonce)
            })
            .collect()
    }

    fn pack(&self, owner: &AccountNumber) -> Result<Vec<u8>, RecordError> {
        Ok(Packer::new(TAG_ISSUE)
            .hex("asset_id", &self.asset_id, ASSET_ID_SIZE)?
            .account(owner)
            .uint64(self.nonce)
            .finish())
    }

    pub fn sign(&mut self, issuer: &Account) -> Result<(), RecordError> {
        let owner = issuer.account_number();
        let signature = issuer.sign(&self.pack(&owner)?);
        self.owner = Some(owner);
        self.signature = Some(hex::encode(signature));
        Ok(())
    }

    pub fn verify(&self) -> Result<(), RecordError> {
        let (Some(owner), Some(signature)) = (&self.owner, &self.signature) else {
            return Err(RecordError::Unsigned);
        };
        let signature =
            hex::decode(signature).map_err(|_| RecordError::InvalidField("signature"))?;
        owner
            .verify(&self.pack(owner)?, &signature)
            .map_err(|_| RecordError::InvalidField("signature"))
    }
}

/// Sign every issue of a batch as `issuer`
pub fn sign_batch(issues: &mut [IssueRecord], issuer: &Account) -> Result<(), RecordError> {
    for issue in issues.iter_mut() {
        issue.sign(issuer)?;
    }
    Ok(())
}
