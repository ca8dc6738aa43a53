use std::{fs, path::PathBuf};

use common::network::Network;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "bitmark";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const ACCOUNTS_FILE_NAME: &str = "accounts.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network every account in this directory belongs to
    #[serde(default)]
    pub network: Network,
    /// Ledger API endpoint
    pub api_url: String,
    /// Encryption key lookup endpoint
    pub key_url: String,
    /// Asset file server
    pub assets_url: String,
    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl AppConfig {
    pub fn for_network(network: Network) -> Self {
        let (api_url, key_url, assets_url) = match network {
            Network::Livenet => (
                "https://api.bitmark.com",
                "https://key.assets.bitmark.com",
                "https://assets.bitmark.com",
            ),
            Network::Testnet => (
                "https://api.test.bitmark.com",
                "https://key.assets.test.bitmark.com",
                "https://assets.test.bitmark.com",
            ),
        };
        Self {
            network,
            api_url: api_url.to_string(),
            key_url: key_url.to_string(),
            assets_url: assets_url.to_string(),
            log_level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the bitmark directory (~/.bitmark)
    pub bitmark_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the account store
    pub accounts_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the bitmark directory path (custom or default ~/.bitmark)
    pub fn bitmark_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }
        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new bitmark state directory
    pub fn init(custom_path: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let bitmark_dir = Self::bitmark_dir(custom_path)?;
        if bitmark_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&bitmark_dir)?;

        let config_path = bitmark_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        let accounts_path = bitmark_dir.join(ACCOUNTS_FILE_NAME);
        fs::write(&accounts_path, "{}")?;

        tracing::info!(path = %bitmark_dir.display(), network = %config.network, "initialized state");
        Ok(Self {
            bitmark_dir,
            config_path,
            accounts_path,
            config,
        })
    }

    /// Load existing state from the bitmark directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let bitmark_dir = Self::bitmark_dir(custom_path)?;
        if !bitmark_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = bitmark_dir.join(CONFIG_FILE_NAME);
        let accounts_path = bitmark_dir.join(ACCOUNTS_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        if !accounts_path.exists() {
            return Err(StateError::MissingFile(ACCOUNTS_FILE_NAME.to_string()));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            bitmark_dir,
            config_path,
            accounts_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("bitmark directory not initialized. Run 'bitmark init' first")]
    NotInitialized,

    #[error("bitmark directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
