//! Anchor Asset Model
//!
//! Typed asset data for the registration pipeline.
//!
//! # Core Concepts
//!
//! - [`AssetRecord`]: one asset's metadata, with a canonical byte form
//! - [`Manifest`]: ordered, read-only input of named records
//! - [`ContentAddress`]: address returned by the content store
//! - [`AddressRecordMap`]: insertion-ordered address → record artifact
//! - [`AssetIdentifier`]: 32-byte Keccak-256 id derived from an address
//! - [`IdentifierSet`]: ordered identifiers submitted to the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use anchor_asset::{derive, Manifest};
//!
//! let manifest = Manifest::from_json_str(r#"{"a": {"name": "Alpha"}}"#)?;
//! let id = derive("QmTy8w65yBXgyfG2ZBg5TrfB2hPjrDQH3RCQFJGkARStJb")?;
//! println!("{id}");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod address;
mod error;
mod identifier;
mod manifest;
mod record;

pub use address::{AddressRecordMap, ContentAddress};
pub use error::{InvalidInputError, InvalidManifestError};
pub use identifier::{derive, keccak256, AssetIdentifier, IdentifierSet};
pub use manifest::Manifest;
pub use record::{canonical_json, AssetRecord, NAME_FIELD};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
