//! Anchor Core
//!
//! Configuration and orchestration for asset registration runs.
//!
//! # Flow
//!
//! 1. Load and validate [`AnchorConfig`]
//! 2. Publish the manifest ([`PublishStage`]) or reuse an artifact
//! 3. Derive one identifier per content address
//! 4. Deploy a registry or append to one ([`RegistrationPipeline`])
//!
//! # Example
//!
//! ```rust,ignore
//! use anchor_core::{backend_for, publisher_for, AnchorConfig, RecordSource, RegistrationPipeline, RunMode, Target};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnchorConfig::load_or_default("anchor.toml")?;
//! let pipeline = RegistrationPipeline::new(
//!     publisher_for(&config, Target::Live)?,
//!     backend_for(&config, Target::Live, None)?,
//!     &config,
//! )?;
//! let report = pipeline.run(RunMode::Deploy, RecordSource::PublishManifest).await?;
//! println!("registry at {}", report.outcome.address());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod runtime;

pub use anchor_asset::AssetIdentifier;
pub use config::{AnchorConfig, PathsConfig, RegistryConfig, SignerConfig, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{
    derive_from_artifact, derive_key, describe, IdentifierEntry, PublishReport, PublishStage,
    PublishedAssets, RecordSource, RegistrationPipeline, RunMode, RunReport,
};
pub use runtime::{backend_for, publisher_for, Target};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
