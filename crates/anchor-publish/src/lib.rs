//! Anchor Publishing
//!
//! Moves asset records from a manifest into a content-addressable store.
//!
//! # Architecture
//!
//! ```text
//! Manifest → ManifestTransformer → ContentPublisher (one round trip per record)
//!                   ↓
//!            AddressRecordMap → artifact file (written after the full pass)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use anchor_publish::{load_manifest, IpfsPublisher, ContentStoreEndpoint, ManifestTransformer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = load_manifest("artwork.json").await?;
//! let publisher = IpfsPublisher::new(ContentStoreEndpoint::default())?;
//! let outcome = ManifestTransformer::new(publisher)
//!     .transform_and_persist(&manifest, "uploaded.json")
//!     .await?;
//! println!("published {} assets", outcome.records.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod artifact;
pub mod error;
pub mod ipfs;
pub mod publisher;
pub mod transformer;

pub use artifact::{load_artifact, load_manifest, write_artifact};
pub use error::{ArtifactError, PublishFailure, TransformError};
pub use ipfs::{parse_add_response, ContentStoreEndpoint, IpfsPublisher, Protocol};
pub use publisher::{ContentPublisher, MemoryContentStore};
pub use transformer::{CollapsedEntry, ManifestTransformer, TransformOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
