//! Content addresses and the address → record map
//!
//! [`AddressRecordMap`] is the audit artifact of a publishing run: every
//! address the content store returned, in the order it was returned, with
//! the record it was computed from.

use crate::error::InvalidInputError;
use crate::record::AssetRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Address assigned by the content store to a payload
///
/// Never empty and never contains whitespace or control characters, so it
/// is always valid input for identifier derivation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Validate and wrap an address string
    ///
    /// # Errors
    /// - `InvalidInputError::Empty` for empty input
    /// - `InvalidInputError::IllegalCharacter` for whitespace or control characters
    pub fn new(address: impl Into<String>) -> Result<Self, InvalidInputError> {
        let address = address.into();
        validate_key(&address)?;
        Ok(Self(address))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shared validation for anything that gets hashed into an identifier
pub(crate) fn validate_key(input: &str) -> Result<(), InvalidInputError> {
    if input.trim().is_empty() {
        return Err(InvalidInputError::Empty);
    }
    if let Some((position, _)) = input
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || c.is_control())
    {
        return Err(InvalidInputError::IllegalCharacter {
            input: input.to_string(),
            position,
        });
    }
    Ok(())
}

impl Display for ContentAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentAddress {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = InvalidInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentAddress> for String {
    fn from(address: ContentAddress) -> Self {
        address.0
    }
}

impl AsRef<str> for ContentAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Insertion-ordered mapping from content address to the published record
///
/// Keyed by address, so byte-identical records collapse to one entry at
/// the position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressRecordMap {
    entries: IndexMap<ContentAddress, AssetRecord>,
}

impl AddressRecordMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a published record
    ///
    /// Returns `false` if the address was already present; the existing
    /// entry and its position are kept.
    pub fn insert(&mut self, address: ContentAddress, record: AssetRecord) -> bool {
        match self.entries.entry(address) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Look up the record for an address
    #[inline]
    #[must_use]
    pub fn get(&self, address: &ContentAddress) -> Option<&AssetRecord> {
        self.entries.get(address)
    }

    /// Addresses in insertion order
    pub fn addresses(&self) -> impl ExactSizeIterator<Item = &ContentAddress> {
        self.entries.keys()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&ContentAddress, &AssetRecord)> {
        self.entries.iter()
    }

    /// Number of distinct addresses
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was published
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> AssetRecord {
        AssetRecord::from_value(name, json!({ "name": name })).unwrap()
    }

    fn addr(s: &str) -> ContentAddress {
        ContentAddress::new(s).unwrap()
    }

    #[test]
    fn address_rejects_empty_and_whitespace() {
        assert_eq!(ContentAddress::new(""), Err(InvalidInputError::Empty));
        assert_eq!(ContentAddress::new("   "), Err(InvalidInputError::Empty));
        assert!(matches!(
            ContentAddress::new("Qm abc"),
            Err(InvalidInputError::IllegalCharacter { position: 2, .. })
        ));
    }

    #[test]
    fn address_display_and_parse() {
        let a: ContentAddress = "QmXyZ".parse().unwrap();
        assert_eq!(a.to_string(), "QmXyZ");
        assert_eq!(a.as_str(), "QmXyZ");
    }

    #[test]
    fn map_keeps_insertion_order() {
        let mut map = AddressRecordMap::new();
        assert!(map.insert(addr("Qm3"), record("Gamma")));
        assert!(map.insert(addr("Qm1"), record("Alpha")));
        assert!(map.insert(addr("Qm2"), record("Beta")));

        let order: Vec<_> = map.addresses().map(ContentAddress::as_str).collect();
        assert_eq!(order, vec!["Qm3", "Qm1", "Qm2"]);
    }

    #[test]
    fn map_collapses_duplicate_address() {
        let mut map = AddressRecordMap::new();
        assert!(map.insert(addr("Qm1"), record("Alpha")));
        assert!(map.insert(addr("Qm2"), record("Beta")));
        assert!(!map.insert(addr("Qm1"), record("Alpha")));

        assert_eq!(map.len(), 2);
        assert_eq!(map.addresses().next().map(ContentAddress::as_str), Some("Qm1"));
    }

    #[test]
    fn map_serializes_in_insertion_order() {
        let mut map = AddressRecordMap::new();
        map.insert(addr("QmB"), record("Beta"));
        map.insert(addr("QmA"), record("Alpha"));

        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"QmB":{"name":"Beta"},"QmA":{"name":"Alpha"}}"#);

        let back: AddressRecordMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn map_deserialize_rejects_empty_address() {
        let result: Result<AddressRecordMap, _> = serde_json::from_str(r#"{"":{"name":"x"}}"#);
        assert!(result.is_err());
    }
}
