//! Publish command - manifest to content store, no chain I/O.

use super::CommandOutput;
use crate::GlobalArgs;
use anchor_core::{publisher_for, AnchorConfig, PublishStage};
use anyhow::Result;

/// Run the publish command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a record fails to
/// publish, or the artifact cannot be written.
pub async fn run(global: &GlobalArgs, config: &AnchorConfig) -> Result<CommandOutput> {
    let publisher = publisher_for(config, global.target())?;
    let published = PublishStage::new(publisher, config)?.run().await?;
    Ok(CommandOutput::Published(published.report))
}
