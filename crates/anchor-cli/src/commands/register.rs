//! Register command - append the manifest's identifiers to a registry.
//!
//! Resubmitting the same batch appends duplicates.

use super::CommandOutput;
use crate::GlobalArgs;
use anchor_core::{
    backend_for, publisher_for, AnchorConfig, ConfigError, RecordSource, RegistrationPipeline,
    RunMode,
};
use anchor_registry::Address;
use anyhow::Result;
use clap::Args;

/// Arguments for the register command.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Deployed registry (defaults to `[registry].address`)
    #[arg(long)]
    pub address: Option<Address>,

    /// Reuse the existing artifact instead of publishing
    #[arg(long)]
    pub from_artifact: bool,
}

/// Run the register command.
///
/// # Errors
///
/// Returns an error if no registry address is known, the configuration is
/// invalid, publishing fails, or the transaction fails.
pub async fn run(args: RegisterArgs, global: &GlobalArgs, mut config: AnchorConfig) -> Result<CommandOutput> {
    let address = args
        .address
        .or(config.registry.address)
        .ok_or(ConfigError::MissingRegistryAddress)?;
    config.registry.address = Some(address);

    let target = global.target();
    let pipeline = RegistrationPipeline::new(
        publisher_for(&config, target)?,
        backend_for(&config, target, Some(address))?,
        &config,
    )?;

    let source = if args.from_artifact {
        RecordSource::ExistingArtifact
    } else {
        RecordSource::PublishManifest
    };
    let report = pipeline.run(RunMode::Register { address }, source).await?;
    Ok(CommandOutput::Run(report))
}
