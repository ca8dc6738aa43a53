use std::fmt;

use crate::encoding::base58::{self, Base58Error, CHECKSUM_SIZE};
use crate::encoding::mnemonic::{self, Language, MnemonicError};
use crate::network::Network;

/// Size of the V1 seed core
pub const SEED_V1_SIZE: usize = 32;
/// Size of a V2 seed: 132 bits packed into 17 bytes, low nibble zero
pub const SEED_V2_SIZE: usize = 17;

const SEED_HEADER_V1: [u8; 3] = [0x5a, 0xfe, 0x01];
const SEED_HEADER_V2: [u8; 3] = [0x5a, 0xfe, 0x02];
const SEED_HEADER_SIZE: usize = 3;

/// header ++ network byte ++ core ++ checksum
const ENCODED_SEED_V1_SIZE: usize = SEED_HEADER_SIZE + 1 + SEED_V1_SIZE + CHECKSUM_SIZE;
/// header ++ seed ++ checksum
const ENCODED_SEED_V2_SIZE: usize = SEED_HEADER_SIZE + SEED_V2_SIZE + CHECKSUM_SIZE;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("invalid seed length")]
    InvalidSeedLength,
    #[error("invalid seed header")]
    InvalidSeedHeader,
    #[error("invalid seed checksum")]
    InvalidChecksum,
    #[error("invalid network byte: {0:#04x}")]
    InvalidNetworkByte(u8),
    #[error("invalid base58 seed: {0}")]
    Base58(Base58Error),
    #[error("invalid recovery phrase: {0}")]
    Mnemonic(#[from] MnemonicError),
    #[error("failed to generate random bytes: {0}")]
    Random(String),
}

impl From<Base58Error> for SeedError {
    fn from(e: Base58Error) -> Self {
        match e {
            Base58Error::InvalidChecksum => SeedError::InvalidChecksum,
            other => SeedError::Base58(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedVersion {
    V1,
    V2,
}

impl fmt::Display for SeedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedVersion::V1 => write!(f, "v1"),
            SeedVersion::V2 => write!(f, "v2"),
        }
    }
}

/// Root secret of an account
///
/// V1 seeds embed their network in the seed string and the 24-word phrase.
/// V2 seeds do not; the network is whatever the caller recovered them under.
#[derive(Clone, PartialEq, Eq)]
pub enum Seed {
    V1 {
        network: Network,
        core: [u8; SEED_V1_SIZE],
    },
    V2 {
        network: Network,
        entropy: [u8; SEED_V2_SIZE],
    },
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("version", &self.version())
            .field("network", &self.network())
            .finish_non_exhaustive()
    }
}

impl Seed {
    /// Generate a fresh V2 seed
    ///
    /// The top nibble of byte 15 is replaced by a mode nibble built from the
    /// high bits of bytes 0..4, inverted on testnet.
    pub fn generate(network: Network) -> Result<Self, SeedError> {
        let mut entropy = [0u8; SEED_V2_SIZE];
        getrandom::getrandom(&mut entropy[..16]).map_err(|e| SeedError::Random(e.to_string()))?;

        // bits 7654xxxx where x is zero
        entropy[16] = entropy[15] & 0xf0;

        let mut mode = entropy[0] & 0x80 | entropy[1] & 0x40 | entropy[2] & 0x20 | entropy[3] & 0x10;
        if network.is_testnet() {
            mode ^= 0xf0;
        }
        entropy[15] = mode | entropy[15] & 0x0f;

        Ok(Seed::V2 { network, entropy })
    }

    pub fn v1(network: Network, core: [u8; SEED_V1_SIZE]) -> Self {
        Seed::V1 { network, core }
    }

    pub fn v2(network: Network, entropy: &[u8]) -> Result<Self, SeedError> {
        if entropy.len() != SEED_V2_SIZE || entropy[SEED_V2_SIZE - 1] & 0x0f != 0 {
            return Err(SeedError::InvalidSeedLength);
        }
        let mut buff = [0u8; SEED_V2_SIZE];
        buff.copy_from_slice(entropy);
        Ok(Seed::V2 {
            network,
            entropy: buff,
        })
    }

    /// Parse a Base58 seed string
    ///
    /// `network` is only consulted for V2 seeds. V1 seeds report the network
    /// they were created on, which the caller must compare against its own.
    pub fn from_base58(encoded: &str, network: Network) -> Result<Self, SeedError> {
        let raw = base58::decode(encoded)?;
        if raw.len() != ENCODED_SEED_V1_SIZE && raw.len() != ENCODED_SEED_V2_SIZE {
            return Err(SeedError::InvalidSeedLength);
        }
        let data = base58::verify_check(&raw)?;

        let (header, body) = data.split_at(SEED_HEADER_SIZE);
        if header == SEED_HEADER_V1 {
            if raw.len() != ENCODED_SEED_V1_SIZE {
                return Err(SeedError::InvalidSeedLength);
            }
            let network = Network::from_seed_prefix(body[0])
                .ok_or(SeedError::InvalidNetworkByte(body[0]))?;
            let mut core = [0u8; SEED_V1_SIZE];
            core.copy_from_slice(&body[1..]);
            Ok(Seed::V1 { network, core })
        } else if header == SEED_HEADER_V2 {
            if raw.len() != ENCODED_SEED_V2_SIZE {
                return Err(SeedError::InvalidSeedLength);
            }
            Seed::v2(network, body)
        } else {
            Err(SeedError::InvalidSeedHeader)
        }
    }

    /// Rebuild a seed from a recovery phrase
    ///
    /// 24 words yield a V1 seed carrying its own network; 12 words yield a
    /// V2 seed on `network`.
    pub fn from_recovery_phrase<S: AsRef<str>>(
        words: &[S],
        language: Language,
        network: Network,
    ) -> Result<Self, SeedError> {
        match words.len() {
            mnemonic::V1_PHRASE_WORDS => {
                let bytes = mnemonic::twenty_four_words_to_bytes(words, language)?;
                let network = Network::from_seed_prefix(bytes[0])
                    .ok_or(SeedError::InvalidNetworkByte(bytes[0]))?;
                let mut core = [0u8; SEED_V1_SIZE];
                core.copy_from_slice(&bytes[1..]);
                Ok(Seed::V1 { network, core })
            }
            mnemonic::V2_PHRASE_WORDS => {
                let bytes = mnemonic::twelve_words_to_bytes(words, language)?;
                Seed::v2(network, &bytes)
            }
            actual => Err(MnemonicError::InvalidWordCount {
                expected: mnemonic::V2_PHRASE_WORDS,
                actual,
            }
            .into()),
        }
    }

    pub fn version(&self) -> SeedVersion {
        match self {
            Seed::V1 { .. } => SeedVersion::V1,
            Seed::V2 { .. } => SeedVersion::V2,
        }
    }

    pub fn network(&self) -> Network {
        match self {
            Seed::V1 { network, .. } | Seed::V2 { network, .. } => *network,
        }
    }

    /// Raw seed bytes: the 32-byte core for V1, the 17-byte seed for V2
    pub fn entropy(&self) -> &[u8] {
        match self {
            Seed::V1 { core, .. } => core,
            Seed::V2 { entropy, .. } => entropy,
        }
    }

    /// Serialize to the versioned, checksummed Base58 seed string
    pub fn to_base58(&self) -> String {
        let mut buffer = Vec::with_capacity(ENCODED_SEED_V1_SIZE);
        match self {
            Seed::V1 { network, core } => {
                buffer.extend_from_slice(&SEED_HEADER_V1);
                buffer.push(network.seed_prefix());
                buffer.extend_from_slice(core);
            }
            Seed::V2 { entropy, .. } => {
                buffer.extend_from_slice(&SEED_HEADER_V2);
                buffer.extend_from_slice(entropy);
            }
        }
        base58::encode_check(&buffer)
    }

    /// 24 words for V1 (network byte ++ core), 12 words for V2
    pub fn recovery_phrase(&self, language: Language) -> Result<Vec<String>, MnemonicError> {
        match self {
            Seed::V1 { network, core } => {
                let mut buffer = Vec::with_capacity(mnemonic::V1_PHRASE_BYTES);
                buffer.push(network.seed_prefix());
                buffer.extend_from_slice(core);
                mnemonic::bytes_to_twenty_four_words(&buffer, language)
            }
            Seed::V2 { entropy, .. } => mnemonic::bytes_to_twelve_words(entropy, language),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const V1_TESTNET: &str = "5XEECt18HGBGNET1PpxLhy5CsCLG9jnmM6Q8QGF4U2yGb1DABXZsVeD";
    const V2_TESTNET: &str = "9J87CAsHdFdoEu6N1unZk3sqhVBkVL8Z8";

    #[test]
    fn test_v1_seed_round_trip() {
        let seed = Seed::from_base58(V1_TESTNET, Network::Livenet).unwrap();
        assert_eq!(seed.version(), SeedVersion::V1);
        assert_eq!(seed.network(), Network::Testnet);
        assert_eq!(seed.to_base58(), V1_TESTNET);
    }

    #[test]
    fn test_v2_seed_takes_network_from_caller() {
        let seed = Seed::from_base58(V2_TESTNET, Network::Testnet).unwrap();
        assert_eq!(seed.version(), SeedVersion::V2);
        assert_eq!(seed.network(), Network::Testnet);
        assert_eq!(seed.entropy().len(), SEED_V2_SIZE);
        assert_eq!(seed.to_base58(), V2_TESTNET);

        let livenet = Seed::from_base58(V2_TESTNET, Network::Livenet).unwrap();
        assert_eq!(livenet.network(), Network::Livenet);
    }

    #[test]
    fn test_generated_seed_round_trips() {
        for network in [Network::Livenet, Network::Testnet] {
            let seed = Seed::generate(network).unwrap();
            assert_eq!(seed.entropy()[16] & 0x0f, 0);
            let parsed = Seed::from_base58(&seed.to_base58(), network).unwrap();
            assert_eq!(parsed, seed);
        }
    }

    #[test]
    fn test_generated_seed_mode_nibble() {
        let seed = Seed::generate(Network::Testnet).unwrap();
        let e = seed.entropy();
        let mode = (e[0] & 0x80 | e[1] & 0x40 | e[2] & 0x20 | e[3] & 0x10) ^ 0xf0;
        assert_eq!(e[15] & 0xf0, mode);
    }

    #[test]
    fn test_bad_checksum() {
        let mut raw = base58::decode(V2_TESTNET).unwrap();
        raw[5] ^= 0xff;
        let corrupted = base58::encode(&raw);
        assert_eq!(
            Seed::from_base58(&corrupted, Network::Testnet),
            Err(SeedError::InvalidChecksum)
        );
    }

    #[test]
    fn test_bad_length() {
        let short = base58::encode_check(&[0x5a, 0xfe, 0x02, 0x00]);
        assert_eq!(
            Seed::from_base58(&short, Network::Testnet),
            Err(SeedError::InvalidSeedLength)
        );
    }

    #[test]
    fn test_bad_header() {
        let mut data = vec![0x5a, 0xfe, 0x03];
        data.extend_from_slice(&[0u8; SEED_V2_SIZE]);
        let encoded = base58::encode_check(&data);
        assert_eq!(
            Seed::from_base58(&encoded, Network::Testnet),
            Err(SeedError::InvalidSeedHeader)
        );
    }

    #[test]
    fn test_v2_low_nibble_must_be_zero() {
        let mut entropy = [0u8; SEED_V2_SIZE];
        entropy[16] = 0x01;
        assert_eq!(
            Seed::v2(Network::Testnet, &entropy),
            Err(SeedError::InvalidSeedLength)
        );
    }

    #[test]
    fn test_v1_phrase_round_trip() {
        let seed = Seed::from_base58(V1_TESTNET, Network::Testnet).unwrap();
        let words = seed.recovery_phrase(Language::English).unwrap();
        assert_eq!(words.len(), 24);
        let recovered = Seed::from_recovery_phrase(&words, Language::English, Network::Livenet).unwrap();
        assert_eq!(recovered, seed);
    }
}
