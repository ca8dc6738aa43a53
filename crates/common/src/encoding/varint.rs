/// Longest encoding of a u64; the ninth byte carries a full 8 bits
pub const MAX_VARINT_SIZE: usize = 9;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VarintError {
    #[error("varint truncated after {0} bytes")]
    Truncated(usize),
    #[error("length prefix {0} exceeds remaining {1} bytes")]
    LengthOverflow(u64, usize),
}

/// Encode a value as a minimal little-endian base-128 varint
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_SIZE);
    append(&mut out, value);
    out
}

/// Append the varint form of `value` to `buffer`
pub fn append(buffer: &mut Vec<u8>, mut value: u64) {
    for _ in 0..MAX_VARINT_SIZE - 1 {
        if value < 0x80 {
            buffer.push(value as u8);
            return;
        }
        buffer.push((value as u8) | 0x80);
        value >>= 7;
    }
    buffer.push(value as u8);
}

/// Append `varint(len) ++ bytes`
pub fn append_bytes(buffer: &mut Vec<u8>, bytes: &[u8]) {
    append(buffer, bytes.len() as u64);
    buffer.extend_from_slice(bytes);
}

/// Decode a varint from the front of `bytes`, returning the value
///  and the number of bytes consumed
pub fn decode(bytes: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value = 0u64;
    for (i, byte) in bytes.iter().take(MAX_VARINT_SIZE).enumerate() {
        if i == MAX_VARINT_SIZE - 1 {
            value |= (*byte as u64) << (7 * i);
            return Ok((value, i + 1));
        }
        value |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(VarintError::Truncated(bytes.len()))
}

/// Decode a length-prefixed byte string, returning the payload
///  and the number of bytes consumed including the prefix
pub fn decode_bytes(bytes: &[u8]) -> Result<(&[u8], usize), VarintError> {
    let (len, used) = decode(bytes)?;
    let remaining = bytes.len() - used;
    if len > remaining as u64 {
        return Err(VarintError::LengthOverflow(len, remaining));
    }
    let end = used + len as usize;
    Ok((&bytes[used..end], end))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_byte_values() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(0x7f), vec![0x7f]);
    }

    #[test]
    fn test_multi_byte_values() {
        assert_eq!(encode(0x80), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
        assert_eq!(encode(16384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_max_value_uses_nine_bytes() {
        let encoded = encode(u64::MAX);
        assert_eq!(encoded.len(), MAX_VARINT_SIZE);
        assert_eq!(encoded[8], 0xff);
        assert_eq!(decode(&encoded).unwrap(), (u64::MAX, MAX_VARINT_SIZE));
    }

    #[test]
    fn test_decode_consumes_only_varint() {
        let mut buffer = encode(1_000_000);
        buffer.extend_from_slice(&[0xde, 0xad]);
        let (value, used) = decode(&buffer).unwrap();
        assert_eq!(value, 1_000_000);
        assert_eq!(used, buffer.len() - 2);
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode(&[0x80, 0x80]), Err(VarintError::Truncated(2)));
        assert_eq!(decode(&[]), Err(VarintError::Truncated(0)));
    }

    #[test]
    fn test_length_prefixed() {
        let mut buffer = Vec::new();
        append_bytes(&mut buffer, b"name");
        assert_eq!(buffer, vec![0x04, b'n', b'a', b'm', b'e']);

        let (payload, used) = decode_bytes(&buffer).unwrap();
        assert_eq!(payload, b"name");
        assert_eq!(used, 5);

        assert_eq!(
            decode_bytes(&[0x05, 0x01]),
            Err(VarintError::LengthOverflow(5, 1))
        );
    }
}
