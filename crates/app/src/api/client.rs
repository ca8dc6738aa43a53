use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use common::access::{AccessGrant, BitmarkInfo, KeyLookup, Registry, StoredContent};
use common::account::{Account, AccountNumber};
use common::crypto::{SessionData, PUBLIC_KEY_SIZE};
use common::record::{Accessibility, IssueRecord, RegistrationRecord, TransferRecord};
use common::request_auth::{sign_request, EncryptionKeyRegistration, SignedRequest};

use super::error::ApiError;
use crate::state::AppConfig;

/// File name suffix the asset server gives encrypted files
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Client for the ledger API, the encryption key service and the asset
/// file server
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub api_url: Url,
    pub key_url: Url,
    pub assets_url: Url,
    client: Client,
}

#[derive(Deserialize)]
struct BitmarkResponse {
    bitmark: BitmarkInfo,
}

#[derive(Deserialize)]
struct AssetResponse {
    asset: AssetStatus,
}

#[derive(Deserialize)]
struct AssetStatus {
    status: String,
}

#[derive(Deserialize)]
struct KeyResponse {
    encryption_pubkey: String,
    #[serde(default)]
    signature: Option<String>,
}

#[derive(Serialize)]
struct IssueRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<[&'a RegistrationRecord; 1]>,
    issues: &'a [IssueRecord],
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    transfer: &'a TransferRecord,
}

#[derive(Deserialize)]
struct Transaction {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    bitmark_id: &'a str,
    owner: &'a AccountNumber,
    session_data: &'a SessionData,
    #[serde(skip_serializing_if = "Option::is_none")]
    lease_expires_at: Option<DateTime<Utc>>,
}

/// Where a bitmark's asset lives and the session data addressed to the
/// requester, if any
#[derive(Deserialize)]
struct AssetAccess {
    #[serde(default)]
    session_data: Option<SessionData>,
    #[serde(default)]
    sender: Option<AccountNumber>,
    #[serde(default)]
    lease_expires_at: Option<DateTime<Utc>>,
}

/// Parse a configured endpoint so relative joins land under its path
fn base_url(value: &str) -> Result<Url, url::ParseError> {
    if value.ends_with('/') {
        Url::parse(value)
    } else {
        Url::parse(&format!("{}/", value))
    }
}

/// `filename` parameter of a Content-Disposition header
pub fn attachment_filename(header: &str) -> Option<String> {
    header.split(';').find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = value.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

fn first_transaction(transactions: Vec<Transaction>) -> Result<String, ApiError> {
    transactions
        .into_iter()
        .next()
        .map(|tx| tx.tx_id)
        .ok_or(ApiError::NoTransaction)
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            api_url: base_url(&config.api_url)?,
            key_url: base_url(&config.key_url)?,
            assets_url: base_url(&config.assets_url)?,
            client,
        })
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    fn with_auth(request: RequestBuilder, auth: &SignedRequest) -> RequestBuilder {
        auth.headers()
            .into_iter()
            .fold(request, |request, (name, value)| request.header(name, value))
    }

    pub async fn bitmark(&self, bitmark_id: &str) -> Result<BitmarkInfo, ApiError> {
        let url = self.api_url.join(&format!("v1/bitmarks/{}", bitmark_id))?;
        let response: BitmarkResponse = Self::send(self.client.get(url)).await?;
        Ok(response.bitmark)
    }

    /// `false` when the ledger does not know the asset yet
    pub async fn asset_confirmed(&self, asset_id: &str) -> Result<bool, ApiError> {
        let url = self.api_url.join(&format!("v1/assets/{}", asset_id))?;
        match Self::send::<AssetResponse>(self.client.get(url)).await {
            Ok(response) => Ok(response.asset.status == "confirmed"),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Submit signed issues, registering `asset` with them when given
    ///
    /// Returns the new bitmark ids in issue order.
    pub async fn issue(
        &self,
        asset: Option<&RegistrationRecord>,
        issues: &[IssueRecord],
    ) -> Result<Vec<String>, ApiError> {
        let url = self.api_url.join("v1/issue")?;
        let body = IssueRequest {
            assets: asset.map(|record| [record]),
            issues,
        };
        tracing::info!(issues = issues.len(), register = asset.is_some(), "submitting issues");
        let transactions: Vec<Transaction> = Self::send(self.client.post(url).json(&body)).await?;
        if transactions.is_empty() {
            return Err(ApiError::NoTransaction);
        }
        Ok(transactions.into_iter().map(|tx| tx.tx_id).collect())
    }

    /// Submit a signed direct transfer and return its transaction id
    pub async fn transfer(&self, record: &TransferRecord) -> Result<String, ApiError> {
        let url = self.api_url.join("v1/transfer")?;
        let body = TransferRequest { transfer: record };
        tracing::info!(link = %record.link, owner = %record.owner, "submitting transfer");
        let transactions: Vec<Transaction> = Self::send(self.client.post(url).json(&body)).await?;
        first_transaction(transactions)
    }

    pub async fn register_encryption_key(&self, account: &Account) -> Result<(), ApiError> {
        let number = account.account_number();
        let url = self
            .api_url
            .join(&format!("v1/encryption_keys/{}", number))?;
        let body = EncryptionKeyRegistration::new(account);
        tracing::info!(account_number = %number, "registering encryption key");
        Self::send_empty(self.client.post(url).json(&body)).await
    }

    pub async fn encryption_key(
        &self,
        account_number: &AccountNumber,
    ) -> Result<[u8; PUBLIC_KEY_SIZE], ApiError> {
        let url = self.key_url.join(account_number.as_str())?;
        let response: KeyResponse = Self::send(self.client.get(url)).await?;
        let invalid = || ApiError::InvalidKey(account_number.to_string());

        match response.signature {
            Some(signature) => EncryptionKeyRegistration {
                encryption_pubkey: response.encryption_pubkey,
                signature,
            }
            .verify(account_number)
            .map_err(|_| invalid()),
            None => {
                let mut key = [0u8; PUBLIC_KEY_SIZE];
                hex::decode_to_slice(&response.encryption_pubkey, &mut key)
                    .map_err(|_| invalid())?;
                Ok(key)
            }
        }
    }

    /// Upload an asset file on behalf of `account`
    pub async fn upload_asset(
        &self,
        account: &Account,
        asset_id: &str,
        content: StoredContent,
    ) -> Result<(), ApiError> {
        let url = self.api_url.join("v1/assets")?;
        let accessibility = match content.accessibility {
            Accessibility::Public => "public",
            Accessibility::Private => "private",
        };
        let form = Form::new()
            .text("asset_id", asset_id.to_string())
            .text("accessibility", accessibility)
            .part(
                "file",
                Part::bytes(content.content).file_name(content.filename),
            );
        let auth = sign_request(account, "uploadAsset", &[asset_id]);
        tracing::info!(asset_id, accessibility, "uploading asset file");
        Self::send_empty(Self::with_auth(self.client.post(url), &auth).multipart(form)).await
    }

    /// Fetch an asset file; `None` when the server has no file for it
    ///
    /// Encrypted files carry the `.enc` suffix on their served name, which
    /// is stripped from the returned file name.
    pub async fn asset_file(&self, asset_id: &str) -> Result<Option<StoredContent>, ApiError> {
        let url = self.assets_url.join(asset_id)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let error = ApiError::from_response(response).await;
            return if error.is_not_found() { Ok(None) } else { Err(error) };
        }

        let served = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_filename)
            .ok_or(ApiError::MissingFileName)?;
        let content = response.bytes().await?.to_vec();

        let stored = match served.strip_suffix(ENCRYPTED_SUFFIX) {
            Some(filename) => StoredContent {
                filename: filename.to_string(),
                content,
                accessibility: Accessibility::Private,
            },
            None => StoredContent {
                filename: served,
                content,
                accessibility: Accessibility::Public,
            },
        };
        Ok(Some(stored))
    }

    /// Address session data for `bitmark_id` to `recipient`
    pub async fn add_session(
        &self,
        account: &Account,
        bitmark_id: &str,
        recipient: &AccountNumber,
        grant: &AccessGrant,
    ) -> Result<(), ApiError> {
        let url = self.api_url.join("v2/session")?;
        let session_json = serde_json::to_string(&grant.session_data)?;
        let auth = sign_request(account, "updateSession", &[&session_json]);
        let body = SessionRequest {
            bitmark_id,
            owner: recipient,
            session_data: &grant.session_data,
            lease_expires_at: grant.lease_expires_at,
        };
        Self::send_empty(Self::with_auth(self.client.post(url), &auth).json(&body)).await
    }

    /// Session data the ledger holds for `account` on `bitmark_id`
    pub async fn asset_access(
        &self,
        account: &Account,
        bitmark_id: &str,
    ) -> Result<Option<AccessGrant>, ApiError> {
        let url = self
            .api_url
            .join(&format!("v1/bitmarks/{}/asset", bitmark_id))?;
        let auth = sign_request(account, "downloadAsset", &[bitmark_id]);
        let access = match Self::send::<AssetAccess>(Self::with_auth(self.client.get(url), &auth))
            .await
        {
            Ok(access) => access,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        match (access.session_data, access.sender) {
            (Some(session_data), Some(sender)) => Ok(Some(AccessGrant {
                sender,
                session_data,
                lease_expires_at: access.lease_expires_at,
            })),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl KeyLookup for ApiClient {
    async fn encryption_public_key(
        &self,
        account_number: &AccountNumber,
    ) -> anyhow::Result<[u8; PUBLIC_KEY_SIZE]> {
        Ok(self.encryption_key(account_number).await?)
    }
}

#[async_trait]
impl Registry for ApiClient {
    async fn bitmark(&self, bitmark_id: &str) -> anyhow::Result<BitmarkInfo> {
        Ok(ApiClient::bitmark(self, bitmark_id).await?)
    }

    async fn asset_confirmed(&self, asset_id: &str) -> anyhow::Result<bool> {
        Ok(ApiClient::asset_confirmed(self, asset_id).await?)
    }
}
