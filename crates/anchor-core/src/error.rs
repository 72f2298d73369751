//! Error types for the registration pipeline
//!
//! Every failure is attributable to a step:
//! - Configuration (before any I/O)
//! - Publishing (names the failing manifest record)
//! - Artifact reading
//! - Identifier derivation
//! - Transaction submission

use anchor_asset::InvalidInputError;
use anchor_publish::{ArtifactError, PublishFailure, TransformError};
use anchor_registry::TransactionFailure;
use std::path::PathBuf;

/// Configuration could not be loaded or is invalid
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field has an unusable value
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A chain run needs a signer and none was given
    #[error("no signer configured (set [signer].address or pass --signer)")]
    MissingSigner,

    /// Incremental registration needs a registry address
    #[error("no registry address configured (set [registry].address or pass --address)")]
    MissingRegistryAddress,

    /// Publisher could not be set up from the endpoint
    #[error("content store setup failed: {0}")]
    ContentStore(#[from] PublishFailure),

    /// Chain backend could not be set up
    #[error("chain backend setup failed: {0}")]
    Backend(#[from] TransactionFailure),
}

impl ConfigError {
    /// Create invalid field error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Any failure of a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("publishing failed: {0}")]
    Transform(#[from] TransformError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error("transaction failed: {0}")]
    Transaction(#[from] TransactionFailure),
}

impl PipelineError {
    /// Name of the step that failed
    #[must_use]
    pub fn step(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Transform(TransformError::Manifest(_)) => "manifest",
            Self::Transform(TransformError::Publish { .. }) => "publish",
            Self::Transform(TransformError::Artifact(_)) | Self::Artifact(_) => "artifact",
            Self::InvalidInput(_) => "derive",
            Self::Transaction(_) => "transaction",
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::invalid("network.rpc_url", "must be an http(s) URL");
        assert_eq!(err.to_string(), "invalid network.rpc_url: must be an http(s) URL");
    }

    #[test]
    fn pipeline_error_step() {
        let err: PipelineError = TransactionFailure::rejected("nonce too low").into();
        assert_eq!(err.step(), "transaction");

        let err: PipelineError = TransformError::Publish {
            index: 0,
            key: "a".to_string(),
            source: PublishFailure::unavailable("memory://", "down"),
        }
        .into();
        assert_eq!(err.step(), "publish");

        let err: PipelineError = ConfigError::MissingSigner.into();
        assert_eq!(err.step(), "configuration");
    }
}
