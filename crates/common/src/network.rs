use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The chain an account lives on
///
/// Threaded explicitly through every operation that depends on it; there is
/// no process-wide active network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Livenet,
    #[default]
    Testnet,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(String);

impl Network {
    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }

    /// Network byte used in V1 seed strings and 24-word phrases
    pub fn seed_prefix(&self) -> u8 {
        match self {
            Network::Livenet => 0x00,
            Network::Testnet => 0x01,
        }
    }

    pub fn from_seed_prefix(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Network::Livenet),
            0x01 => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Livenet => write!(f, "livenet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "livenet" | "bitmark" => Ok(Network::Livenet),
            "testnet" => Ok(Network::Testnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}
