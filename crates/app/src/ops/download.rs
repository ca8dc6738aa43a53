use std::path::PathBuf;

use clap::Args;

use common::access::AccessError;

use crate::op::Op;
use crate::ops::{access_control, load_account, LoadAccountError};

/// Fetch and decrypt the asset file of a bitmark
#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Account number of the owner or lessee
    pub account_number: String,

    pub bitmark_id: String,

    /// Where to write the file (defaults to its name in the current directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Load(#[from] LoadAccountError),
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, account) = load_account(ctx, &self.account_number).await?;
        let client = ctx.client(&state)?;
        let asset = access_control(&client, &account)
            .download(&account, &self.bitmark_id)
            .await?;

        // never let a served name escape the current directory
        let path = match &self.output {
            Some(path) => path.clone(),
            None => PathBuf::from(
                PathBuf::from(&asset.filename)
                    .file_name()
                    .map(|name| name.to_os_string())
                    .unwrap_or_else(|| self.bitmark_id.clone().into()),
            ),
        };
        tokio::fs::write(&path, &asset.content)
            .await
            .map_err(|e| DownloadError::Write(path.clone(), e))?;

        Ok(format!(
            "Downloaded {} ({} bytes) to {}",
            asset.filename,
            asset.content.len(),
            path.display()
        ))
    }
}
