//! Deploy command - new registry seeded with the manifest's identifiers.
//!
//! Every invocation creates a new contract.

use super::CommandOutput;
use crate::GlobalArgs;
use anchor_core::{
    backend_for, publisher_for, AnchorConfig, RecordSource, RegistrationPipeline, RunMode,
};
use anyhow::Result;
use clap::Args;

/// Arguments for the deploy command.
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Reuse the existing artifact instead of publishing
    #[arg(long)]
    pub from_artifact: bool,

    /// Deploy this contract with no constructor arguments and stop
    #[arg(long, value_name = "CONTRACT", conflicts_with = "from_artifact")]
    pub bare: Option<String>,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, publishing fails, or
/// the deployment transaction fails.
pub async fn run(args: DeployArgs, global: &GlobalArgs, config: AnchorConfig) -> Result<CommandOutput> {
    let target = global.target();
    let pipeline = RegistrationPipeline::new(
        publisher_for(&config, target)?,
        backend_for(&config, target, None)?,
        &config,
    )?;

    if let Some(contract) = args.bare {
        return Ok(CommandOutput::Bare(pipeline.deploy_bare(&contract).await?));
    }

    let source = if args.from_artifact {
        RecordSource::ExistingArtifact
    } else {
        RecordSource::PublishManifest
    };
    Ok(CommandOutput::Run(pipeline.run(RunMode::Deploy, source).await?))
}
