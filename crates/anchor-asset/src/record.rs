//! Asset records and their canonical encoding
//!
//! An [`AssetRecord`] is the metadata of one digital asset as it appears in
//! the manifest. Its canonical byte form is what gets published to the
//! content store, so two records with the same fields always produce the
//! same bytes regardless of the key order in the source file.

use crate::error::InvalidManifestError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field every asset record must carry
pub const NAME_FIELD: &str = "name";

/// Metadata for one digital asset
///
/// Always a JSON object with a string `name` field; any other fields are
/// carried through untouched. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct AssetRecord {
    fields: Map<String, Value>,
}

impl AssetRecord {
    /// Build a record from a JSON value, checking its shape
    ///
    /// # Errors
    /// - `InvalidManifestError::NotAnObject` if the value is not an object
    /// - `InvalidManifestError::MissingName` if `name` is absent or not a string
    pub fn from_value(key: &str, value: Value) -> Result<Self, InvalidManifestError> {
        let Value::Object(fields) = value else {
            return Err(InvalidManifestError::NotAnObject {
                key: key.to_string(),
            });
        };

        match fields.get(NAME_FIELD) {
            Some(Value::String(_)) => Ok(Self { fields }),
            _ => Err(InvalidManifestError::MissingName {
                key: key.to_string(),
            }),
        }
    }

    /// The asset's display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.fields
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Look up an arbitrary field
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields of the record
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Canonical byte form: compact JSON, object keys sorted at every depth
    ///
    /// # Errors
    /// Returns error if a leaf value cannot be written as JSON
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::with_capacity(128);
        write_object(&self.fields, &mut out)?;
        Ok(out)
    }
}

impl TryFrom<Value> for AssetRecord {
    type Error = InvalidManifestError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value("<record>", value)
    }
}

impl From<AssetRecord> for Value {
    fn from(record: AssetRecord) -> Self {
        Value::Object(record.fields)
    }
}

/// Encode any JSON value canonically
///
/// # Errors
/// Returns error if a leaf value cannot be written as JSON
pub fn canonical_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

// Key order is imposed here rather than relying on serde_json's map type,
// which follows insertion order when `preserve_order` is enabled anywhere
// in the dependency graph.
fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), serde_json::Error> {
    match value {
        Value::Object(map) => write_object(map, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
            Ok(())
        }
        leaf => serde_json::to_writer(&mut *out, leaf),
    }
}

fn write_object(map: &Map<String, Value>, out: &mut Vec<u8>) -> Result<(), serde_json::Error> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable();

    out.push(b'{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        serde_json::to_writer(&mut *out, key)?;
        out.push(b':');
        write_value(&map[key], out)?;
    }
    out.push(b'}');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> AssetRecord {
        AssetRecord::from_value("test", value).unwrap()
    }

    #[test]
    fn record_requires_object() {
        let err = AssetRecord::from_value("k", json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, InvalidManifestError::NotAnObject { key } if key == "k"));
    }

    #[test]
    fn record_requires_string_name() {
        let err = AssetRecord::from_value("k", json!({ "image": "x.png" })).unwrap_err();
        assert!(matches!(err, InvalidManifestError::MissingName { .. }));

        let err = AssetRecord::from_value("k", json!({ "name": 7 })).unwrap_err();
        assert!(matches!(err, InvalidManifestError::MissingName { .. }));
    }

    #[test]
    fn record_exposes_name_and_fields() {
        let r = record(json!({ "name": "Buffalo", "attributes": [{ "trait_type": "BackgroundColor" }] }));
        assert_eq!(r.name(), "Buffalo");
        assert!(r.get("attributes").is_some());
        assert_eq!(r.fields().len(), 2);
    }

    #[test]
    fn canonical_bytes_sort_keys() {
        let r = record(json!({ "name": "Zebra", "b": 1, "a": { "z": true, "y": null } }));
        let bytes = r.canonical_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"y":null,"z":true},"b":1,"name":"Zebra"}"#
        );
    }

    #[test]
    fn canonical_bytes_ignore_source_order() {
        let a: Value = serde_json::from_str(r#"{"name":"Alpha","image":"a.png","x":[1,2]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"x":[1,2],"image":"a.png","name":"Alpha"}"#).unwrap();
        assert_eq!(
            record(a).canonical_bytes().unwrap(),
            record(b).canonical_bytes().unwrap()
        );
    }

    #[test]
    fn canonical_json_escapes_strings() {
        let bytes = canonical_json(&json!({ "name": "quote\"d" })).unwrap();
        assert_eq!(bytes, br#"{"name":"quote\"d"}"#.to_vec());
    }

    #[test]
    fn record_serde_roundtrip_through_value() {
        let r = record(json!({ "name": "Alpha", "description": "first" }));
        let text = serde_json::to_string(&r).unwrap();
        let back: AssetRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(r, back);
    }

    proptest! {
        #[test]
        fn prop_canonical_bytes_deterministic(
            name in "[a-zA-Z ]{1,16}",
            extra in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..6),
        ) {
            let mut fields = Map::new();
            for (k, v) in &extra {
                fields.insert(k.clone(), json!(v));
            }
            fields.insert(NAME_FIELD.to_string(), json!(name));
            let r = record(Value::Object(fields));
            prop_assert_eq!(r.canonical_bytes().unwrap(), r.canonical_bytes().unwrap());
        }
    }
}
