use serde::{Deserialize, Serialize};

use super::{Packer, RecordError, TAG_COUNTERSIGNED_TRANSFER, TAG_DIRECT_TRANSFER};
use crate::account::{Account, AccountNumber};
use crate::request_auth::{sign_request, SignedRequest};

const LINK_SIZE: usize = 32;
const SIGNATURE_SIZE: usize = 64;

/// Transfer of a bitmark to `owner`, linked to its latest transaction
///
/// A direct transfer is final once the sender signs it. An offer needs the
/// receiver's countersignature before the ledger accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub link: String,
    pub owner: AccountNumber,
    pub signature: Option<String>,
    #[serde(skip)]
    countersigned: bool,
}

impl TransferRecord {
    pub fn direct(link: &str, owner: AccountNumber) -> Self {
        Self {
            link: link.to_string(),
            owner,
            signature: None,
            countersigned: false,
        }
    }

    pub fn offer(link: &str, owner: AccountNumber) -> Self {
        Self {
            countersigned: true,
            ..Self::direct(link, owner)
        }
    }

    pub fn requires_countersignature(&self) -> bool {
        self.countersigned
    }

    fn pack(&self) -> Result<Vec<u8>, RecordError> {
        let tag = if self.countersigned {
            TAG_COUNTERSIGNED_TRANSFER
        } else {
            TAG_DIRECT_TRANSFER
        };
        Ok(Packer::new(tag)
            .hex("link", &self.link, LINK_SIZE)?
            .no_payment()
            .account(&self.owner)
            .finish())
    }

    pub fn sign(&mut self, sender: &Account) -> Result<(), RecordError> {
        self.signature = Some(hex::encode(sender.sign(&self.pack()?)));
        Ok(())
    }

    pub fn verify(&self, sender: &AccountNumber) -> Result<(), RecordError> {
        let signature = self.signature.as_deref().ok_or(RecordError::Unsigned)?;
        let signature =
            hex::decode(signature).map_err(|_| RecordError::InvalidField("signature"))?;
        sender
            .verify(&self.pack()?, &signature)
            .map_err(|_| RecordError::InvalidField("signature"))
    }

    /// Turn a signed offer into the record the receiver countersigns
    pub fn into_countersigned(self) -> Result<CountersignedTransferRecord, RecordError> {
        if !self.countersigned {
            return Err(RecordError::InvalidField("countersignature"));
        }
        let signature = self.signature.ok_or(RecordError::Unsigned)?;
        Ok(CountersignedTransferRecord {
            link: self.link,
            owner: self.owner,
            signature,
            countersignature: None,
        })
    }
}

/// An offer signed by the sender and awaiting the receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersignedTransferRecord {
    pub link: String,
    pub owner: AccountNumber,
    pub signature: String,
    pub countersignature: Option<String>,
}

impl CountersignedTransferRecord {
    fn pack(&self) -> Result<Vec<u8>, RecordError> {
        Ok(Packer::new(TAG_COUNTERSIGNED_TRANSFER)
            .hex("link", &self.link, LINK_SIZE)?
            .no_payment()
            .account(&self.owner)
            .hex("signature", &self.signature, SIGNATURE_SIZE)?
            .finish())
    }

    /// Countersign as the receiving owner
    pub fn countersign(&mut self, receiver: &Account) -> Result<(), RecordError> {
        if receiver.account_number() != self.owner {
            return Err(RecordError::InvalidField("owner"));
        }
        self.countersignature = Some(hex::encode(receiver.sign(&self.pack()?)));
        Ok(())
    }

    pub fn verify_countersignature(&self) -> Result<(), RecordError> {
        let countersignature = self
            .countersignature
            .as_deref()
            .ok_or(RecordError::Unsigned)?;
        let countersignature = hex::decode(countersignature)
            .map_err(|_| RecordError::InvalidField("countersignature"))?;
        self.owner
            .verify(&self.pack()?, &countersignature)
            .map_err(|_| RecordError::InvalidField("countersignature"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferAction {
    Accept,
    Reject,
    Cancel,
}

/// Receiver's answer to a pending offer
#[derive(Debug, Clone, Serialize)]
pub struct OfferResponse {
    pub id: String,
    pub action: OfferAction,
    pub countersignature: Option<String>,
    #[serde(skip)]
    record: CountersignedTransferRecord,
}

impl OfferResponse {
    pub fn new(id: &str, action: OfferAction, record: CountersignedTransferRecord) -> Self {
        Self {
            id: id.to_string(),
            action,
            countersignature: None,
            record,
        }
    }

    pub fn record(&self) -> &CountersignedTransferRecord {
        &self.record
    }

    /// Authenticate the response and, on accept, countersign the offer
    pub fn sign(&mut self, account: &Account) -> Result<SignedRequest, RecordError> {
        let auth = sign_request(account, "updateOffer", &[&self.id]);
        if self.action == OfferAction::Accept {
            self.record.countersign(account)?;
            self.countersignature = self.record.countersignature.clone();
        }
        Ok(auth)
    }
}
