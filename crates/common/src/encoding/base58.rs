use tiny_keccak::{Hasher, Sha3};

/// Bytes of SHA3-256 appended to checksummed payloads
pub const CHECKSUM_SIZE: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Base58Error {
    #[error("invalid base58 string: {0}")]
    Decode(String),
    #[error("payload too short for checksum: {0} bytes")]
    TooShort(usize),
    #[error("invalid checksum")]
    InvalidChecksum,
}

impl From<bs58::decode::Error> for Base58Error {
    fn from(e: bs58::decode::Error) -> Self {
        Base58Error::Decode(e.to_string())
    }
}

pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    Ok(bs58::decode(s).into_vec()?)
}

pub(crate) fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// First four bytes of SHA3-256 over `data`
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let digest = sha3_256(data);
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    out
}

/// Base58 of `data ++ checksum(data)`
pub fn encode_check(data: &[u8]) -> String {
    let mut buffer = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    buffer.extend_from_slice(data);
    buffer.extend_from_slice(&checksum(data));
    encode(&buffer)
}

/// Split the trailing checksum off a raw decoded buffer and verify it
pub fn verify_check(raw: &[u8]) -> Result<&[u8], Base58Error> {
    if raw.len() < CHECKSUM_SIZE {
        return Err(Base58Error::TooShort(raw.len()));
    }
    let (data, sum) = raw.split_at(raw.len() - CHECKSUM_SIZE);
    if checksum(data) != sum {
        return Err(Base58Error::InvalidChecksum);
    }
    Ok(data)
}

/// Decode a checksummed string, returning the payload without the checksum
pub fn decode_check(s: &str) -> Result<Vec<u8>, Base58Error> {
    let raw = decode(s)?;
    Ok(verify_check(&raw)?.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let data = b"bitmark";
        let encoded = encode(data);
        assert_eq!(decode(&encoded).unwrap(), data.to_vec());
        assert!(decode("0OIl").is_err());
    }

    #[test]
    fn test_checksum_round_trip() {
        let data = [0x13u8, 0x01, 0x02, 0x03];
        let encoded = encode_check(&data);
        assert_eq!(decode_check(&encoded).unwrap(), data.to_vec());
    }

    #[test]
    fn test_every_flipped_byte_is_rejected() {
        let data: Vec<u8> = (0u8..36).collect();
        let mut raw = data.clone();
        raw.extend_from_slice(&checksum(&data));

        for i in 0..raw.len() {
            let mut corrupted = raw.clone();
            corrupted[i] ^= 0x01;
            assert_eq!(
                verify_check(&corrupted),
                Err(Base58Error::InvalidChecksum),
                "byte {} not detected",
                i
            );
        }
    }

    #[test]
    fn test_too_short() {
        assert_eq!(verify_check(&[1, 2, 3]), Err(Base58Error::TooShort(3)));
    }
}
