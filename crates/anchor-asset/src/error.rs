//! Error types for asset data
//!
//! - Manifest shape and parse failures
//! - Rejected identifier derivation input

use std::path::PathBuf;

/// Manifest could not be read or has the wrong shape
#[derive(Debug, thiserror::Error)]
pub enum InvalidManifestError {
    /// Manifest file could not be read
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not a JSON object of records
    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Record is not a JSON object
    #[error("record '{key}' is not a JSON object")]
    NotAnObject { key: String },

    /// Record lacks a string `name` field
    #[error("record '{key}' has no string 'name' field")]
    MissingName { key: String },
}

impl InvalidManifestError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Input rejected before hashing or addressing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInputError {
    /// Empty or whitespace-only input
    #[error("empty input")]
    Empty,

    /// Input carries whitespace or control characters
    #[error("input contains whitespace or control character at byte {position}: {input:?}")]
    IllegalCharacter { input: String, position: usize },

    /// Hex text did not decode to the expected width
    #[error("invalid identifier: expected 32 bytes of hex, got {0:?}")]
    InvalidIdentifier(String),
}
