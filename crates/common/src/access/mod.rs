//! Asset access control over external collaborators
//!
//! The ledger, key service, content store and session store are traits
//! (see [`provider`]); this module drives the session-data protocol across
//! them:
//! - [`AccessControl::publish`]: seal a file and hand its data key to the issuer
//! - [`AccessControl::download`]: recover the data key and open the file
//! - [`AccessControl::rekey_for_transfer`]: box the data key for a new owner
//! - [`AccessControl::grant_lease`]: box the data key for a lessee until a deadline
//!
//! Policy checks (ownership, lease expiry) run before any key is touched.

pub mod provider;

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::account::{Account, AccountNumber};
use crate::crypto::{DataKey, DataKeyError, SessionData, SessionError, UsedDataKey, PUBLIC_KEY_SIZE};
use crate::record::{asset_id, compute_fingerprint, Accessibility};

pub use provider::{
    AccessGrant, BitmarkInfo, ContentStore, KeyLookup, Registry, SessionStore, StoredContent,
};

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("{requester} does not own bitmark {bitmark_id}")]
    NotOwner {
        bitmark_id: String,
        requester: AccountNumber,
    },
    #[error("lease of {holder} on bitmark {bitmark_id} expired at {expired_at}")]
    LeaseExpired {
        bitmark_id: String,
        holder: AccountNumber,
        expired_at: DateTime<Utc>,
    },
    #[error("invalid lease duration")]
    InvalidLeaseDuration,
    #[error("no session data for {holder} on bitmark {bitmark_id}")]
    NoAccess {
        bitmark_id: String,
        holder: AccountNumber,
    },
    #[error("asset content not found: {0}")]
    ContentNotFound(String),
    #[error("no bitmarks to publish")]
    NoBitmarks,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    DataKey(#[from] DataKeyError),
    #[error("collaborator error: {0}")]
    Provider(#[from] anyhow::Error),
    #[error(transparent)]
    Publish(PublishFailure),
}

/// Outcome of the two publish legs when at least one failed
///
/// A `None` leg completed, and its side effect is in place.
#[derive(Debug, thiserror::Error)]
pub struct PublishFailure {
    pub upload: Option<Box<AccessError>>,
    pub session: Option<Box<AccessError>>,
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "publish failed")?;
        match &self.upload {
            Some(e) => write!(f, "; upload: {}", e)?,
            None => write!(f, "; upload: ok")?,
        }
        match &self.session {
            Some(e) => write!(f, "; session data: {}", e),
            None => write!(f, "; session data: ok"),
        }
    }
}

/// An asset file before upload
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub name: String,
    pub content: Vec<u8>,
    pub accessibility: Accessibility,
}

impl AssetFile {
    pub fn new(name: &str, content: Vec<u8>, accessibility: Accessibility) -> Self {
        Self {
            name: name.to_string(),
            content,
            accessibility,
        }
    }

    pub fn fingerprint(&self) -> String {
        compute_fingerprint(&self.content)
    }

    pub fn asset_id(&self) -> String {
        asset_id(&self.fingerprint())
    }
}

/// A downloaded and, if needed, decrypted asset file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    pub filename: String,
    pub content: Vec<u8>,
}

pub struct AccessControl<R, K, C, S> {
    registry: R,
    keys: K,
    content: C,
    sessions: S,
}

impl<R, K, C, S> AccessControl<R, K, C, S>
where
    R: Registry,
    K: KeyLookup,
    C: ContentStore,
    S: SessionStore,
{
    pub fn new(registry: R, keys: K, content: C, sessions: S) -> Self {
        Self {
            registry,
            keys,
            content,
            sessions,
        }
    }

    /// Upload an issued asset file
    ///
    /// Private files are sealed with a fresh data key, then the upload and
    /// the publication of the issuer's session data for every bitmark run
    /// concurrently. Both legs always run to completion and any failures are
    /// reported together.
    pub async fn publish(
        &self,
        issuer: &Account,
        bitmark_ids: &[String],
        file: AssetFile,
    ) -> Result<(), AccessError> {
        if bitmark_ids.is_empty() {
            return Err(AccessError::NoBitmarks);
        }
        let asset_id = file.asset_id();
        tracing::info!(%asset_id, bitmarks = bitmark_ids.len(), accessibility = ?file.accessibility, "publishing asset");

        if file.accessibility == Accessibility::Public {
            let stored = StoredContent {
                filename: file.name,
                content: file.content,
                accessibility: Accessibility::Public,
            };
            self.content.upload(&asset_id, stored).await?;
            return Ok(());
        }

        let (ciphertext, data_key) = DataKey::generate()?.encrypt(&file.content)?;
        let stored = StoredContent {
            filename: file.name,
            content: ciphertext,
            accessibility: Accessibility::Private,
        };

        let upload = async {
            self.content
                .upload(&asset_id, stored)
                .await
                .map_err(AccessError::Provider)
        };
        let session = self.publish_sessions(issuer, bitmark_ids, &data_key);
        let (upload, session) = futures::join!(upload, session);

        match (upload, session) {
            (Ok(()), Ok(())) => Ok(()),
            (upload, session) => {
                let failure = PublishFailure {
                    upload: upload.err().map(Box::new),
                    session: session.err().map(Box::new),
                };
                tracing::warn!(%asset_id, error = %failure, "publish incomplete");
                Err(AccessError::Publish(failure))
            }
        }
    }

    async fn publish_sessions(
        &self,
        issuer: &Account,
        bitmark_ids: &[String],
        data_key: &UsedDataKey,
    ) -> Result<(), AccessError> {
        let encr_key = issuer.encr_key();
        let session_data = SessionData::create(encr_key, data_key, &encr_key.public_key_bytes())?;
        let issuer_number = issuer.account_number();
        for bitmark_id in bitmark_ids {
            let grant = AccessGrant::ownership(issuer_number.clone(), session_data.clone());
            self.sessions.put(bitmark_id, &issuer_number, grant).await?;
        }
        Ok(())
    }

    /// Fetch an asset file as `holder`
    ///
    /// Public files come back as stored. Private files need a grant for the
    /// holder that is still in force: an ownership grant while the holder
    /// owns the bitmark, or an unexpired lease. The data key is opened with
    /// the grant sender's public key.
    pub async fn download(
        &self,
        holder: &Account,
        bitmark_id: &str,
    ) -> Result<DownloadedAsset, AccessError> {
        let bitmark = self.registry.bitmark(bitmark_id).await?;
        let stored = self
            .content
            .download(&bitmark.asset_id)
            .await?
            .ok_or_else(|| AccessError::ContentNotFound(bitmark.asset_id.clone()))?;

        if stored.accessibility == Accessibility::Public {
            return Ok(DownloadedAsset {
                filename: stored.filename,
                content: stored.content,
            });
        }

        let holder_number = holder.account_number();
        let grant = self
            .sessions
            .current(bitmark_id, &holder_number)
            .await?
            .ok_or_else(|| AccessError::NoAccess {
                bitmark_id: bitmark_id.to_string(),
                holder: holder_number.clone(),
            })?;
        check_grant(&bitmark, &holder_number, &grant)?;
        let data_key = self.open_grant(holder, &grant).await?;
        tracing::debug!(bitmark_id, holder = %holder_number, "opened session data");

        Ok(DownloadedAsset {
            filename: stored.filename,
            content: data_key.decrypt(&stored.content)?,
        })
    }

    /// Box the data key of `bitmark_id` for its next owner
    ///
    /// Returns `None` for public assets, which carry no session data.
    pub async fn rekey_for_transfer(
        &self,
        owner: &Account,
        bitmark_id: &str,
        new_owner: &AccountNumber,
    ) -> Result<Option<SessionData>, AccessError> {
        self.rewrap(owner, bitmark_id, new_owner, None).await
    }

    /// Box the data key of `bitmark_id` for a lessee for `duration`;
    /// ownership is unchanged
    pub async fn grant_lease(
        &self,
        owner: &Account,
        bitmark_id: &str,
        lessee: &AccountNumber,
        duration: Duration,
    ) -> Result<Option<SessionData>, AccessError> {
        if duration <= Duration::zero() {
            return Err(AccessError::InvalidLeaseDuration);
        }
        let expires_at = Utc::now()
            .checked_add_signed(duration)
            .ok_or(AccessError::InvalidLeaseDuration)?;
        self.rewrap(owner, bitmark_id, lessee, Some(expires_at))
            .await
    }

    async fn rewrap(
        &self,
        owner: &Account,
        bitmark_id: &str,
        recipient: &AccountNumber,
        lease_expires_at: Option<DateTime<Utc>>,
    ) -> Result<Option<SessionData>, AccessError> {
        let owner_number = owner.account_number();
        let bitmark = self.registry.bitmark(bitmark_id).await?;
        if bitmark.owner != owner_number {
            return Err(AccessError::NotOwner {
                bitmark_id: bitmark_id.to_string(),
                requester: owner_number,
            });
        }

        let Some(grant) = self.sessions.current(bitmark_id, &owner_number).await? else {
            return match self.content.accessibility(&bitmark.asset_id).await? {
                Some(Accessibility::Public) => Ok(None),
                _ => Err(AccessError::NoAccess {
                    bitmark_id: bitmark_id.to_string(),
                    holder: owner_number,
                }),
            };
        };

        let data_key = self.open_grant(owner, &grant).await?;
        let recipient_key = self.public_key_of(owner, recipient).await?;
        let session_data = SessionData::create(owner.encr_key(), &data_key, &recipient_key)?;

        let grant = AccessGrant {
            sender: owner_number,
            session_data: session_data.clone(),
            lease_expires_at,
        };
        self.sessions.put(bitmark_id, recipient, grant).await?;
        tracing::info!(bitmark_id, %recipient, lease = lease_expires_at.is_some(), "issued session data");
        Ok(Some(session_data))
    }

    async fn open_grant(
        &self,
        holder: &Account,
        grant: &AccessGrant,
    ) -> Result<UsedDataKey, AccessError> {
        let sender_key = self.public_key_of(holder, &grant.sender).await?;
        Ok(grant.session_data.open(holder.encr_key(), &sender_key)?)
    }

    /// Encryption public key of `account_number`, answered locally for `me`
    async fn public_key_of(
        &self,
        me: &Account,
        account_number: &AccountNumber,
    ) -> Result<[u8; PUBLIC_KEY_SIZE], AccessError> {
        if *account_number == me.account_number() {
            return Ok(me.encr_key().public_key_bytes());
        }
        Ok(self.keys.encryption_public_key(account_number).await?)
    }
}

/// Whether `grant` still lets `holder` open the data key of `bitmark`
fn check_grant(
    bitmark: &BitmarkInfo,
    holder: &AccountNumber,
    grant: &AccessGrant,
) -> Result<(), AccessError> {
    match grant.lease_expires_at {
        Some(expired_at) if Utc::now() >= expired_at => Err(AccessError::LeaseExpired {
            bitmark_id: bitmark.id.clone(),
            holder: holder.clone(),
            expired_at,
        }),
        Some(_) => Ok(()),
        None if bitmark.owner != *holder => Err(AccessError::NotOwner {
            bitmark_id: bitmark.id.clone(),
            requester: holder.clone(),
        }),
        None => Ok(()),
    }
}
