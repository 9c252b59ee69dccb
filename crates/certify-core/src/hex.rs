//! Hex utilities (no external hex crate dependency).

use crate::error::CryptoError;

/// Encode bytes as lowercase hex.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The first four bytes as hex, for `Debug` output.
pub fn prefix(bytes: &[u8]) -> String {
    encode(&bytes[..bytes.len().min(4)])
}

/// Decode a hex string, tolerating an optional `0x` prefix and surrounding whitespace.
pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.len() % 2 != 0 {
        return Err(CryptoError::InvalidHex(format!(
            "hex string has odd length: {}",
            s.len()
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CryptoError::InvalidHex(format!("invalid hex at position {i}")))
        })
        .collect()
}

/// Decode a hex string into a fixed-size array.
pub fn decode_array<const N: usize>(s: &str) -> Result<[u8; N], CryptoError> {
    let bytes = decode(s)?;
    bytes.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidHex(format!("expected {N} bytes, got {}", bytes.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let bytes = [0x00, 0xab, 0xff];
        assert_eq!(encode(&bytes), "00abff");
        assert_eq!(decode("00abff").unwrap(), bytes.to_vec());
        assert_eq!(decode("0x00ABFF").unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode("abc").is_err());
        assert!(decode("zz").is_err());
        assert!(decode("é0").is_err());
    }

    #[test]
    fn test_decode_array_length_checked() {
        assert!(decode_array::<4>("0011").is_err());
        assert_eq!(decode_array::<2>("0011").unwrap(), [0x00, 0x11]);
    }
}
