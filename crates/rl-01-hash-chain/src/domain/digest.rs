//! Digest value type

use crate::error::{ChainError, ChainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Digest length in bytes (SHA-256)
pub const DIGEST_LEN: usize = 32;

/// Digest length when rendered as hex
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// A 256-bit chain digest.
///
/// Always rendered as 64 uppercase hexadecimal characters, both in
/// `Display` and in its serialized form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Previous digest used for an issuer's first registration.
    pub const GENESIS: Digest = Digest([0u8; DIGEST_LEN]);

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn is_genesis(&self) -> bool {
        *self == Self::GENESIS
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse a 64 character hex digest. Lowercase input is accepted.
    pub fn from_hex(text: &str) -> ChainResult<Self> {
        if text.len() != DIGEST_HEX_LEN {
            return Err(ChainError::MalformedDigest {
                reason: format!("expected {} hex characters, got {}", DIGEST_HEX_LEN, text.len()),
            });
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(text, &mut bytes).map_err(|e| ChainError::MalformedDigest {
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Digest::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_all_zero_hex() {
        assert_eq!(Digest::GENESIS.to_hex(), "0".repeat(DIGEST_HEX_LEN));
        assert!(Digest::GENESIS.is_genesis());
    }

    #[test]
    fn test_hex_is_uppercase() {
        let digest = Digest([0xab; DIGEST_LEN]);
        assert_eq!(digest.to_hex(), "AB".repeat(DIGEST_LEN));
    }

    #[test]
    fn test_from_hex_accepts_lowercase() {
        let digest = Digest::from_hex(&"ab".repeat(DIGEST_LEN)).unwrap();
        assert_eq!(digest, Digest([0xab; DIGEST_LEN]));
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        let result = Digest::from_hex("ABCD");
        assert!(matches!(result, Err(ChainError::MalformedDigest { .. })));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let result = Digest::from_hex(&"ZZ".repeat(DIGEST_LEN));
        assert!(matches!(result, Err(ChainError::MalformedDigest { .. })));
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let digest = Digest([0x01; DIGEST_LEN]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(DIGEST_LEN)));

        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
