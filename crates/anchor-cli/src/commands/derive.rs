//! Derive command - identifiers for an artifact or a single key.

use super::CommandOutput;
use anchor_core::{derive_from_artifact, derive_key, AnchorConfig};
use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the derive command.
#[derive(Debug, Args)]
pub struct DeriveArgs {
    /// Derive this key instead of reading the artifact
    pub key: Option<String>,
}

/// Run the derive command.
///
/// # Errors
///
/// Returns an error if the key is invalid or the artifact cannot be read.
pub async fn run(args: DeriveArgs, config: &AnchorConfig) -> Result<CommandOutput> {
    if let Some(key) = args.key {
        let identifier = derive_key(&key)?;
        return Ok(CommandOutput::Key { key, identifier });
    }

    let path = &config.paths.artifact;
    let entries = derive_from_artifact(path)
        .await
        .with_context(|| format!("cannot derive identifiers from {}", path.display()))?;
    Ok(CommandOutput::Identifiers(entries))
}
