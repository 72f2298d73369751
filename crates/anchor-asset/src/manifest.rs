//! Manifest of named asset records
//!
//! The manifest is read-only input. Its top-level key order is preserved
//! because it fixes the order of the published addresses and therefore of
//! the identifiers submitted on-chain.

use crate::error::InvalidManifestError;
use crate::record::AssetRecord;
use indexmap::IndexMap;
use serde_json::Value;

/// Ordered mapping from a human-chosen key to an asset record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: IndexMap<String, AssetRecord>,
}

impl Manifest {
    /// Create an empty manifest
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest JSON text
    ///
    /// # Errors
    /// - `InvalidManifestError::Malformed` if the text is not a JSON object
    /// - `NotAnObject`/`MissingName` for the first bad record, by key
    pub fn from_json_str(text: &str) -> Result<Self, InvalidManifestError> {
        let raw: IndexMap<String, Value> = serde_json::from_str(text)?;
        let mut entries = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            let record = AssetRecord::from_value(&key, value)?;
            entries.insert(key, record);
        }
        Ok(Self { entries })
    }

    /// Append an entry; an existing key keeps its position and takes the new record
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, record: AssetRecord) -> Self {
        self.entries.insert(key.into(), record);
        self
    }

    /// Iterate entries in stored order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &AssetRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a record by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AssetRecord> {
        self.entries.get(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries
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

    #[test]
    fn parse_preserves_key_order() {
        let manifest = Manifest::from_json_str(
            r#"{
                "zebra": { "name": "Zebra" },
                "buffalo": { "name": "Buffalo" },
                "antelope": { "name": "Antelope" }
            }"#,
        )
        .unwrap();

        let keys: Vec<_> = manifest.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zebra", "buffalo", "antelope"]);
    }

    #[test]
    fn parse_empty_object() {
        let manifest = Manifest::from_json_str("{}").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn parse_rejects_non_object_root() {
        let err = Manifest::from_json_str(r#"[{ "name": "Alpha" }]"#).unwrap_err();
        assert!(matches!(err, InvalidManifestError::Malformed(_)));
    }

    #[test]
    fn parse_rejects_bad_record_by_key() {
        let err = Manifest::from_json_str(r#"{ "a": { "name": "Alpha" }, "b": { "title": "Beta" } }"#)
            .unwrap_err();
        assert!(matches!(err, InvalidManifestError::MissingName { key } if key == "b"));
    }

    #[test]
    fn builder_appends_entries() {
        let alpha = AssetRecord::from_value("a", json!({ "name": "Alpha" })).unwrap();
        let manifest = Manifest::new().with_entry("a", alpha.clone());
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("a"), Some(&alpha));
    }
}
