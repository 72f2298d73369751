//! Manifest and artifact files
//!
//! The artifact is written wholesale, and only once a run has published
//! every record: bytes go to a `.partial` sibling that is then renamed over
//! the target. A failed run leaves the previous artifact, if any, in place.

use crate::error::ArtifactError;
use anchor_asset::{AddressRecordMap, InvalidManifestError, Manifest};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix of the staging file used while writing the artifact
pub const STAGING_SUFFIX: &str = ".partial";

/// Read and validate a manifest file
///
/// # Errors
/// - `InvalidManifestError::Io` if the file cannot be read
/// - any shape error from [`Manifest::from_json_str`]
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest, InvalidManifestError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InvalidManifestError::io_error(path, e))?;
    Manifest::from_json_str(&text)
}

/// Read a previously written artifact
///
/// # Errors
/// - `ArtifactError::Io` if the file cannot be read
/// - `ArtifactError::Malformed` if it is not an address → record map
pub async fn load_artifact(path: impl AsRef<Path>) -> Result<AddressRecordMap, ArtifactError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ArtifactError::io_error(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the artifact at `path` with `records`
///
/// # Errors
/// - `ArtifactError::Serialization` if the map cannot be encoded
/// - `ArtifactError::Io` if staging or renaming fails
pub async fn write_artifact(
    path: impl AsRef<Path>,
    records: &AddressRecordMap,
) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(records)?;
    let staging = staging_path(path);

    if let Err(e) = tokio::fs::write(&staging, &bytes).await {
        discard(&staging).await;
        return Err(ArtifactError::io_error(&staging, e));
    }

    if let Err(e) = tokio::fs::rename(&staging, path).await {
        discard(&staging).await;
        return Err(ArtifactError::io_error(path, e));
    }

    tracing::info!("Wrote {} entries to {}", records.len(), path.display());
    Ok(())
}

/// Best effort; the write or rename error is the one reported
async fn discard(staging: &Path) {
    if let Err(e) = tokio::fs::remove_file(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Could not remove {}: {}", staging.display(), e);
        }
    }
}

/// Staging path for an artifact target
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}
