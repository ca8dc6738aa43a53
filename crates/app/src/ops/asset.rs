use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;

use common::access::Registry;
use common::record::{RecordError, RegistrationRecord};

use crate::api::ApiError;
use crate::op::Op;
use crate::ops::{load_account, LoadAccountError};
use crate::state::StateError;

crate::command_enum! {
    (Register, Register),
    (Status, Status),
}

pub type AssetCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Asset {
    #[command(subcommand)]
    pub command: AssetCommand,
}

#[async_trait::async_trait]
impl Op for Asset {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// Sign a registration record and print it; `bitmark issue` submits
/// registrations together with their first issues
#[derive(Args, Debug, Clone)]
pub struct Register {
    /// Account number of the registrant
    pub account_number: String,

    /// Asset name (1 to 64 characters)
    #[arg(long)]
    pub name: String,

    /// File to fingerprint
    #[arg(long)]
    pub file: PathBuf,

    /// Metadata entry as key=value; may repeat
    #[arg(long = "meta", value_parser = parse_meta)]
    pub metadata: Vec<(String, String)>,
}

pub(crate) fn parse_meta(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl Op for Register {
    type Error = RegisterError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, account) = load_account(ctx, &self.account_number).await?;
        let content = tokio::fs::read(&self.file)
            .await
            .map_err(|e| RegisterError::Read(self.file.clone(), e))?;

        let metadata: BTreeMap<String, String> = self.metadata.iter().cloned().collect();
        let mut record = RegistrationRecord::new(&self.name, &metadata)?;
        record.set_fingerprint(&content)?;
        record.sign(&account)?;
        tracing::debug!(asset_id = %record.asset_id(), "signed registration record");
        Ok(serde_json::to_string_pretty(&record)?)
    }
}

#[derive(Args, Debug, Clone)]
pub struct Status {
    /// Asset id to look up on the ledger
    pub asset_id: String,

    /// Also show the ledger view of this bitmark
    #[arg(long)]
    pub bitmark: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("registry error: {0}")]
    Registry(#[from] anyhow::Error),
}

#[async_trait::async_trait]
impl Op for Status {
    type Error = StatusError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let registry = ctx.client(&state)?;

        let confirmed = Registry::asset_confirmed(&registry, &self.asset_id).await?;
        let mut output = format!(
            "Asset {}: {}",
            self.asset_id,
            if confirmed { "confirmed" } else { "pending or unknown" }
        );
        if let Some(bitmark_id) = &self.bitmark {
            let bitmark = Registry::bitmark(&registry, bitmark_id).await?;
            output.push_str(&format!(
                "\nBitmark {}\n - Asset: {}\n - Issuer: {}\n - Owner: {}\n - Head: {}",
                bitmark.id, bitmark.asset_id, bitmark.issuer, bitmark.owner, bitmark.head_id
            ));
        }
        Ok(output)
    }
}
