use clap::Args;

use common::network::Network;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Network for accounts in this directory (livenet or testnet)
    #[arg(long, default_value = "testnet")]
    pub network: Network,

    /// Ledger API endpoint (defaults to the network's public endpoint)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Encryption key service endpoint (defaults to the network's public endpoint)
    #[arg(long)]
    pub key_url: Option<String>,

    /// Asset file server (defaults to the network's public endpoint)
    #[arg(long)]
    pub assets_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig::for_network(self.network);
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(key_url) = &self.key_url {
            config.key_url = key_url.clone();
        }
        if let Some(assets_url) = &self.assets_url {
            config.assets_url = assets_url.clone();
        }

        let state = AppState::init(ctx.config_path.clone(), config)?;

        Ok(format!(
            "Initialized bitmark directory at: {}\n\
             - Config: {}\n\
             - Accounts: {}\n\
             - Network: {}\n\
             - API: {}\n\
             - Key service: {}\n\
             - Assets: {}",
            state.bitmark_dir.display(),
            state.config_path.display(),
            state.accounts_path.display(),
            state.config.network,
            state.config.api_url,
            state.config.key_url,
            state.config.assets_url,
        ))
    }
}
