//! Chain-level value types
//!
//! - [`Address`]: 20-byte account or contract address
//! - [`TxHash`]: 32-byte transaction hash

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Errors parsing chain values from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseValueError {
    /// Not 0x-prefixed hex of the right width
    #[error("invalid {kind}: expected 0x followed by {digits} hex digits, got {input:?}")]
    InvalidHex {
        kind: &'static str,
        digits: usize,
        input: String,
    },
}

fn parse_fixed<const N: usize>(kind: &'static str, input: &str) -> Result<[u8; N], ParseValueError> {
    let invalid = || ParseValueError::InvalidHex {
        kind,
        digits: N * 2,
        input: input.to_string(),
    };
    let digits = input.strip_prefix("0x").ok_or_else(invalid)?;
    let mut bytes = [0u8; N];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
    Ok(bytes)
}

/// 20-byte account or contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// Create address from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// True for the all-zero address
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed("address", s).map(Self)
    }
}

impl TryFrom<String> for Address {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// 32-byte transaction hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// Create hash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed("transaction hash", s).map(Self)
    }
}

impl TryFrom<String> for TxHash {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parse_and_display() {
        let text = "0x758de11d79b8adca127c35612f35a660d5eb8d94";
        let address: Address = text.parse().unwrap();
        assert_eq!(address.to_string(), text);
    }

    #[test]
    fn address_parse_accepts_checksum_case() {
        let address: Address = "0x758dE11D79B8adca127c35612f35A660D5Eb8d94".parse().unwrap();
        assert_eq!(address.to_string(), "0x758de11d79b8adca127c35612f35a660d5eb8d94");
    }

    #[test]
    fn address_parse_rejects_bad_input() {
        assert!("758de11d79b8adca127c35612f35a660d5eb8d94".parse::<Address>().is_err());
        assert!("0x758de1".parse::<Address>().is_err());
        assert!("0xzz8de11d79b8adca127c35612f35a660d5eb8d94".parse::<Address>().is_err());
    }

    #[test]
    fn zero_address() {
        assert!(Address::default().is_zero());
        assert!(!Address::new([1; 20]).is_zero());
    }

    #[test]
    fn tx_hash_serde_is_hex_string() {
        let hash = TxHash::new([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<TxHash>(&json).unwrap(), hash);
    }
}
