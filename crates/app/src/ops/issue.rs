use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;

use common::access::{AccessError, AssetFile};
use common::record::{sign_batch, Accessibility, IssueRecord, NonceGenerator, RecordError, RegistrationRecord};

use crate::api::ApiError;
use crate::op::Op;
use crate::ops::asset::parse_meta;
use crate::ops::{access_control, load_account, LoadAccountError};

/// Register an asset if needed, issue bitmarks of it and upload the file
#[derive(Args, Debug, Clone)]
pub struct Issue {
    /// Account number of the issuer
    pub account_number: String,

    /// Asset name (1 to 64 characters)
    #[arg(long)]
    pub name: String,

    /// Asset file
    #[arg(long)]
    pub file: PathBuf,

    /// Metadata entry as key=value; may repeat
    #[arg(long = "meta", value_parser = parse_meta)]
    pub metadata: Vec<(String, String)>,

    /// Number of bitmarks to issue
    #[arg(long, default_value_t = 1)]
    pub quantity: usize,

    /// Upload the file unencrypted
    #[arg(long)]
    pub public: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("issued {} but publishing the asset failed: {source}", .bitmark_ids.join(", "))]
    Publish {
        bitmark_ids: Vec<String>,
        source: AccessError,
    },
}

#[async_trait::async_trait]
impl Op for Issue {
    type Error = IssueError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.quantity == 0 {
            return Err(IssueError::InvalidQuantity);
        }
        let (state, account) = load_account(ctx, &self.account_number).await?;
        let filename = self
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| IssueError::NoFileName(self.file.clone()))?;
        let content = tokio::fs::read(&self.file)
            .await
            .map_err(|e| IssueError::Read(self.file.clone(), e))?;

        let metadata: BTreeMap<String, String> = self.metadata.iter().cloned().collect();
        let mut record = RegistrationRecord::new(&self.name, &metadata)?;
        record.set_fingerprint(&content)?;
        record.sign(&account)?;
        let asset_id = record.asset_id();

        let client = ctx.client(&state)?;
        let confirmed = client.asset_confirmed(&asset_id).await?;
        let mut issues =
            IssueRecord::batch(&asset_id, self.quantity, confirmed, &NonceGenerator::new());
        sign_batch(&mut issues, &account)?;

        let registration = (!confirmed).then_some(&record);
        let bitmark_ids = client.issue(registration, &issues).await?;
        tracing::info!(%asset_id, bitmarks = bitmark_ids.len(), "issued bitmarks");

        let accessibility = if self.public {
            Accessibility::Public
        } else {
            Accessibility::Private
        };
        let file = AssetFile::new(&filename, content, accessibility);
        if let Err(source) = access_control(&client, &account)
            .publish(&account, &bitmark_ids, file)
            .await
        {
            return Err(IssueError::Publish {
                bitmark_ids,
                source,
            });
        }

        Ok(format!(
            "Issued {} bitmark(s) of asset {}\n{}",
            bitmark_ids.len(),
            asset_id,
            bitmark_ids
                .iter()
                .map(|id| format!(" - {}", id))
                .collect::<Vec<_>>()
                .join("\n")
        ))
    }
}
