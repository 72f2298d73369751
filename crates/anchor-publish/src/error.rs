//! Error types for publishing
//!
//! Provides error handling for:
//! - Content store round trips (per payload)
//! - Manifest transformation (per record)
//! - Artifact persistence

use anchor_asset::{InvalidInputError, InvalidManifestError};
use std::path::PathBuf;

/// A payload could not be published to the content store
#[derive(Debug, thiserror::Error)]
pub enum PublishFailure {
    /// Store could not be reached
    #[error("content store {endpoint} unavailable: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// HTTP transport failed
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Store answered with a non-success status
    #[error("content store rejected payload ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Payload exceeds the configured limit
    #[error("payload too large: {size} bytes (max: {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Store response could not be understood
    #[error("malformed content store response: {0}")]
    MalformedResponse(String),

    /// Record could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store returned an unusable address
    #[error("invalid content address: {0}")]
    InvalidAddress(#[from] InvalidInputError),

    /// Endpoint URL could not be parsed
    #[error("invalid content store URL '{input}': {reason}")]
    InvalidEndpoint { input: String, reason: &'static str },
}

impl PublishFailure {
    /// Create unavailable error
    pub fn unavailable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reading or writing the address → record artifact
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// IO error on the artifact path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact content is not a valid address → record map
    #[error("malformed artifact {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Map could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArtifactError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from a manifest transformation run
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Manifest could not be loaded
    #[error("invalid manifest: {0}")]
    Manifest(#[from] InvalidManifestError),

    /// A record failed to publish; the run was aborted at this record
    #[error("publishing record #{index} '{key}' failed: {source}")]
    Publish {
        index: usize,
        key: String,
        #[source]
        source: PublishFailure,
    },

    /// Artifact could not be persisted
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

impl TransformError {
    /// Manifest key of the failing record, if the failure is record-specific
    #[must_use]
    pub fn record_key(&self) -> Option<&str> {
        match self {
            Self::Publish { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_failure_display() {
        let err = PublishFailure::PayloadTooLarge { size: 20, limit: 10 };
        assert_eq!(err.to_string(), "payload too large: 20 bytes (max: 10)");
    }

    #[test]
    fn transform_error_names_record() {
        let err = TransformError::Publish {
            index: 1,
            key: "buffalo".to_string(),
            source: PublishFailure::unavailable("https://ipfs.infura.io:5001", "connection refused"),
        };
        assert_eq!(err.record_key(), Some("buffalo"));
        assert!(err.to_string().contains("#1 'buffalo'"));
    }

    #[test]
    fn error_conversions() {
        let io = ArtifactError::io_error("uploaded.json", std::io::Error::from(std::io::ErrorKind::NotFound));
        let err: TransformError = io.into();
        assert!(matches!(err, TransformError::Artifact(_)));
        assert_eq!(err.record_key(), None);
    }
}
