//! Deterministic on-chain asset identifiers
//!
//! Provides [`AssetIdentifier`], the 32-byte value the registry contract
//! stores, and [`derive`], the single function that produces it. The hash
//! is Keccak-256 over the UTF-8 bytes of the input, the same digest the
//! EVM toolchain uses for `bytes32` string ids.

use crate::address::{validate_key, AddressRecordMap, ContentAddress};
use crate::error::InvalidInputError;
use sha3::{Digest, Keccak256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte asset identifier (Keccak-256)
///
/// Same input string always yields the same identifier, independent of
/// run, network or time. Cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetIdentifier([u8; 32]);

impl AssetIdentifier {
    /// Create identifier from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to byte array (consumes self)
    #[inline]
    #[must_use]
    pub const fn into_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Identifier for a published content address
    ///
    /// Infallible because a [`ContentAddress`] is validated on construction.
    #[inline]
    #[must_use]
    pub fn for_address(address: &ContentAddress) -> Self {
        keccak256(address.as_str().as_bytes())
    }

    /// Short string representation (first 8 bytes as hex, no prefix)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

/// Derive the identifier for an arbitrary key
///
/// # Errors
/// - `InvalidInputError::Empty` for empty or whitespace-only input
/// - `InvalidInputError::IllegalCharacter` for embedded whitespace or control characters
pub fn derive(input: &str) -> Result<AssetIdentifier, InvalidInputError> {
    validate_key(input)?;
    Ok(keccak256(input.as_bytes()))
}

/// Raw Keccak-256 digest
#[inline]
#[must_use]
pub fn keccak256(data: &[u8]) -> AssetIdentifier {
    let digest = Keccak256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    AssetIdentifier(bytes)
}

impl Display for AssetIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AssetIdentifier {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| InvalidInputError::InvalidIdentifier(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8; 32]> for AssetIdentifier {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl serde::Serialize for AssetIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> serde::Deserialize<'de> for AssetIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IdentifierVisitor;

        impl<'de> serde::de::Visitor<'de> for IdentifierVisitor {
            type Value = AssetIdentifier;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 32-byte identifier as 0x-prefixed hex or bytes")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let bytes: [u8; 32] = value
                    .try_into()
                    .map_err(|_| serde::de::Error::invalid_length(value.len(), &"32 bytes"))?;
                Ok(AssetIdentifier(bytes))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(IdentifierVisitor)
        } else {
            deserializer.deserialize_bytes(IdentifierVisitor)
        }
    }
}

/// Ordered identifiers submitted to the registry contract
///
/// Order follows the [`AddressRecordMap`] it was derived from. Duplicates
/// are not removed client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct IdentifierSet(Vec<AssetIdentifier>);

impl IdentifierSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive one identifier per address, in map order
    #[must_use]
    pub fn from_records(records: &AddressRecordMap) -> Self {
        Self(records.addresses().map(AssetIdentifier::for_address).collect())
    }

    /// Identifiers as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[AssetIdentifier] {
        &self.0
    }

    /// Iterate in submission order
    pub fn iter(&self) -> std::slice::Iter<'_, AssetIdentifier> {
        self.0.iter()
    }

    /// Number of identifiers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<AssetIdentifier>> for IdentifierSet {
    fn from(ids: Vec<AssetIdentifier>) -> Self {
        Self(ids)
    }
}

impl FromIterator<AssetIdentifier> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = AssetIdentifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a AssetIdentifier;
    type IntoIter = std::slice::Iter<'a, AssetIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AssetRecord;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn derive_matches_known_keccak_vector() {
        let id = derive("hello").unwrap();
        assert_eq!(
            id.to_string(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn derive_rejects_empty_input() {
        assert_eq!(derive(""), Err(InvalidInputError::Empty));
        assert_eq!(derive(" \t"), Err(InvalidInputError::Empty));
    }

    #[test]
    fn derive_rejects_embedded_control_characters() {
        assert!(matches!(
            derive("Qm\nabc"),
            Err(InvalidInputError::IllegalCharacter { position: 2, .. })
        ));
    }

    #[test]
    fn derive_agrees_with_address_path() {
        let address = ContentAddress::new("QmTy8w65yBXgyfG2ZBg5TrfB2hPjrDQH3RCQFJGkARStJb").unwrap();
        assert_eq!(AssetIdentifier::for_address(&address), derive(address.as_str()).unwrap());
    }

    #[test]
    fn identifier_display_and_parse() {
        let id = derive("QmAlpha").unwrap();
        let text = id.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 66);
        assert_eq!(text.parse::<AssetIdentifier>().unwrap(), id);
        assert_eq!(text[2..].parse::<AssetIdentifier>().unwrap(), id);
    }

    #[test]
    fn identifier_parse_rejects_wrong_width() {
        assert!(matches!(
            "0xabcd".parse::<AssetIdentifier>(),
            Err(InvalidInputError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn identifier_short() {
        let id = derive("QmAlpha").unwrap();
        assert_eq!(id.short().len(), 16);
        assert!(id.to_string()[2..].starts_with(&id.short()));
    }

    #[test]
    fn identifier_serde_json_is_hex() {
        let id = derive("QmAlpha").unwrap();
        let text = serde_json::to_string(&id).unwrap();
        assert_eq!(text, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<AssetIdentifier>(&text).unwrap(), id);
    }

    #[test]
    fn set_follows_map_order() {
        let mut map = AddressRecordMap::new();
        for (addr, name) in [("QmC", "Gamma"), ("QmA", "Alpha"), ("QmB", "Beta")] {
            let record = AssetRecord::from_value(name, json!({ "name": name })).unwrap();
            map.insert(ContentAddress::new(addr).unwrap(), record);
        }

        let set = IdentifierSet::from_records(&map);
        let expected: Vec<_> = ["QmC", "QmA", "QmB"].iter().map(|a| derive(a).unwrap()).collect();
        assert_eq!(set.as_slice(), expected.as_slice());
    }

    #[test]
    fn set_from_empty_map_is_empty() {
        assert!(IdentifierSet::from_records(&AddressRecordMap::new()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_derive_is_stable(input in "[!-~]{1,64}") {
            prop_assert_eq!(derive(&input).unwrap(), derive(&input).unwrap());
        }

        #[test]
        fn prop_distinct_inputs_distinct_ids(a in "[a-z0-9]{1,32}", b in "[a-z0-9]{1,32}") {
            prop_assume!(a != b);
            prop_assert_ne!(derive(&a).unwrap(), derive(&b).unwrap());
        }
    }
}
