//! In-process stand-in for the ledger API, key service and asset server
//!
//! Records are verified the way the ledger verifies them, so tests exercise
//! real signatures end to end.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use common::access::{AccessGrant, BitmarkInfo};
use common::account::AccountNumber;
use common::crypto::SessionData;
use common::network::Network;
use common::record::{IssueRecord, RegistrationRecord, TransferRecord};
use common::request_auth::{
    EncryptionKeyRegistration, SignedRequest, HEADER_REQUESTER, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};

use super::client::ENCRYPTED_SUFFIX;
use crate::state::AppConfig;

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub private: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub assets: HashMap<String, RegistrationRecord>,
    pub bitmarks: HashMap<String, BitmarkInfo>,
    pub keys: HashMap<String, EncryptionKeyRegistration>,
    pub files: HashMap<String, StoredFile>,
    /// Latest grant per (bitmark id, recipient)
    pub sessions: HashMap<(String, String), AccessGrant>,
    pub issue_bodies: Vec<Value>,
    tx_counter: u64,
}

impl Recorded {
    fn next_tx(&mut self) -> String {
        self.tx_counter += 1;
        format!("{:064x}", self.tx_counter)
    }
}

type Ledger = Arc<Mutex<Recorded>>;

pub struct TestLedger {
    addr: SocketAddr,
    state: Ledger,
}

impl TestLedger {
    pub async fn start() -> Self {
        let state = Ledger::default();
        let router = Router::new()
            .route("/v1/issue", post(issue))
            .route("/v1/transfer", post(transfer))
            .route("/v1/bitmarks/:id", get(bitmark))
            .route("/v1/bitmarks/:id/asset", get(asset_access))
            .route("/v1/assets", post(upload_asset))
            .route("/v1/assets/:id", get(asset_status))
            .route("/v1/encryption_keys/:account", post(register_key))
            .route("/v2/session", post(add_session))
            .route("/keys/:account", get(lookup_key))
            .route("/files/:asset_id", get(asset_file))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, state }
    }

    /// Client configuration pointing every endpoint at this server
    pub fn config(&self) -> AppConfig {
        AppConfig {
            network: Network::Testnet,
            api_url: format!("http://{}", self.addr),
            key_url: format!("http://{}/keys", self.addr),
            assets_url: format!("http://{}/files", self.addr),
            log_level: "warn".to_string(),
        }
    }

    pub fn recorded(&self) -> Recorded {
        self.state.lock().unwrap().clone()
    }
}

fn failure(status: StatusCode, code: i64, message: impl Into<String>) -> Response {
    (status, Json(json!({ "code": code, "message": message.into() }))).into_response()
}

fn authenticate(headers: &HeaderMap, action: &str, parts: &[&str]) -> Result<String, Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, 2000, "missing auth header"))
    };
    let signed = SignedRequest {
        requester: header(HEADER_REQUESTER)?,
        timestamp: header(HEADER_TIMESTAMP)?,
        signature: header(HEADER_SIGNATURE)?,
    };
    signed
        .verify(action, parts)
        .map_err(|_| failure(StatusCode::UNAUTHORIZED, 2001, "invalid signature"))?;
    Ok(signed.requester)
}

async fn issue(State(ledger): State<Ledger>, Json(body): Json<Value>) -> Response {
    let assets: Vec<RegistrationRecord> = match body.get("assets") {
        Some(assets) => match serde_json::from_value(assets.clone()) {
            Ok(assets) => assets,
            Err(e) => return failure(StatusCode::BAD_REQUEST, 1003, e.to_string()),
        },
        None => Vec::new(),
    };
    let issues = body
        .get("issues")
        .map(|issues| serde_json::from_value::<Vec<IssueRecord>>(issues.clone()));
    let issues = match issues {
        Some(Ok(issues)) => issues,
        _ => return failure(StatusCode::BAD_REQUEST, 1003, "issues are required"),
    };
    if assets.iter().any(|a| a.verify().is_err()) || issues.iter().any(|i| i.verify().is_err()) {
        return failure(StatusCode::BAD_REQUEST, 1004, "invalid signature");
    }

    let mut recorded = ledger.lock().unwrap();
    recorded.issue_bodies.push(body.clone());
    for asset in assets {
        recorded.assets.insert(asset.asset_id(), asset);
    }
    if issues.iter().any(|i| !recorded.assets.contains_key(&i.asset_id)) {
        return failure(StatusCode::BAD_REQUEST, 1000, "asset not found");
    }

    let mut transactions = Vec::new();
    for issue in issues {
        let Some(owner) = issue.owner else {
            return failure(StatusCode::BAD_REQUEST, 1004, "unsigned issue");
        };
        let id = recorded.next_tx();
        recorded.bitmarks.insert(
            id.clone(),
            BitmarkInfo {
                id: id.clone(),
                asset_id: issue.asset_id,
                issuer: owner.clone(),
                owner,
                head_id: id.clone(),
            },
        );
        transactions.push(json!({ "txId": id }));
    }
    Json(transactions).into_response()
}

#[derive(Deserialize)]
struct TransferBody {
    transfer: TransferRecord,
}

async fn transfer(State(ledger): State<Ledger>, Json(body): Json<TransferBody>) -> Response {
    let record = body.transfer;
    let mut recorded = ledger.lock().unwrap();
    let Some(bitmark_id) = recorded
        .bitmarks
        .values()
        .find(|b| b.head_id == record.link)
        .map(|b| b.id.clone())
    else {
        return failure(StatusCode::BAD_REQUEST, 1001, "link is not the head of any bitmark");
    };
    let owner = recorded.bitmarks[&bitmark_id].owner.clone();
    if record.verify(&owner).is_err() {
        return failure(StatusCode::BAD_REQUEST, 1004, "invalid signature");
    }

    let tx_id = recorded.next_tx();
    if let Some(bitmark) = recorded.bitmarks.get_mut(&bitmark_id) {
        bitmark.owner = record.owner;
        bitmark.head_id = tx_id.clone();
    }
    Json(json!([{ "txId": tx_id }])).into_response()
}

async fn bitmark(State(ledger): State<Ledger>, Path(id): Path<String>) -> Response {
    match ledger.lock().unwrap().bitmarks.get(&id) {
        Some(bitmark) => Json(json!({ "bitmark": bitmark })).into_response(),
        None => failure(StatusCode::NOT_FOUND, 1002, "bitmark not found"),
    }
}

async fn asset_status(State(ledger): State<Ledger>, Path(id): Path<String>) -> Response {
    if ledger.lock().unwrap().assets.contains_key(&id) {
        Json(json!({ "asset": { "id": id, "status": "confirmed" } })).into_response()
    } else {
        failure(StatusCode::NOT_FOUND, 1000, "asset not found")
    }
}

async fn register_key(
    State(ledger): State<Ledger>,
    Path(account): Path<String>,
    Json(registration): Json<EncryptionKeyRegistration>,
) -> Response {
    let Ok(number) = AccountNumber::parse(&account) else {
        return failure(StatusCode::BAD_REQUEST, 3000, "invalid account number");
    };
    if registration.verify(&number).is_err() {
        return failure(StatusCode::BAD_REQUEST, 3001, "invalid key signature");
    }
    ledger.lock().unwrap().keys.insert(account, registration);
    StatusCode::OK.into_response()
}

async fn lookup_key(State(ledger): State<Ledger>, Path(account): Path<String>) -> Response {
    match ledger.lock().unwrap().keys.get(&account) {
        Some(registration) => Json(registration.clone()).into_response(),
        None => failure(StatusCode::NOT_FOUND, 3002, "encryption key not found"),
    }
}

async fn upload_asset(
    State(ledger): State<Ledger>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut asset_id = None;
    let mut private = false;
    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "asset_id" => asset_id = field.text().await.ok(),
            "accessibility" => private = field.text().await.ok().as_deref() == Some("private"),
            "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                if let Ok(bytes) = field.bytes().await {
                    file = Some((filename, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }
    let (Some(asset_id), Some((filename, content))) = (asset_id, file) else {
        return failure(StatusCode::BAD_REQUEST, 4000, "asset_id and file are required");
    };
    if let Err(response) = authenticate(&headers, "uploadAsset", &[&asset_id]) {
        return response;
    }

    ledger.lock().unwrap().files.insert(
        asset_id,
        StoredFile {
            filename,
            content,
            private,
        },
    );
    StatusCode::OK.into_response()
}

async fn asset_file(State(ledger): State<Ledger>, Path(asset_id): Path<String>) -> Response {
    let Some(file) = ledger.lock().unwrap().files.get(&asset_id).cloned() else {
        return failure(StatusCode::NOT_FOUND, 4001, "asset file not found");
    };
    let served = if file.private {
        format!("{}{}", file.filename, ENCRYPTED_SUFFIX)
    } else {
        file.filename
    };
    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", served),
        )],
        file.content,
    )
        .into_response()
}

#[derive(Deserialize)]
struct SessionBody {
    bitmark_id: String,
    owner: AccountNumber,
    session_data: SessionData,
    #[serde(default)]
    lease_expires_at: Option<DateTime<Utc>>,
}

async fn add_session(
    State(ledger): State<Ledger>,
    headers: HeaderMap,
    Json(body): Json<SessionBody>,
) -> Response {
    let session_json = match serde_json::to_string(&body.session_data) {
        Ok(json) => json,
        Err(e) => return failure(StatusCode::BAD_REQUEST, 5000, e.to_string()),
    };
    let requester = match authenticate(&headers, "updateSession", &[&session_json]) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    let Ok(sender) = AccountNumber::parse(&requester) else {
        return failure(StatusCode::BAD_REQUEST, 3000, "invalid account number");
    };

    let grant = AccessGrant {
        sender,
        session_data: body.session_data,
        lease_expires_at: body.lease_expires_at,
    };
    ledger
        .lock()
        .unwrap()
        .sessions
        .insert((body.bitmark_id, body.owner.to_string()), grant);
    StatusCode::OK.into_response()
}

async fn asset_access(
    State(ledger): State<Ledger>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let requester = match authenticate(&headers, "downloadAsset", &[&id]) {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    let grant = ledger
        .lock()
        .unwrap()
        .sessions
        .get(&(id.clone(), requester))
        .cloned();
    let url = format!("/files/{}", id);
    match grant {
        Some(grant) => Json(json!({
            "url": url,
            "session_data": grant.session_data,
            "sender": grant.sender,
            "lease_expires_at": grant.lease_expires_at,
        }))
        .into_response(),
        None => Json(json!({ "url": url, "session_data": null, "sender": null })).into_response(),
    }
}
