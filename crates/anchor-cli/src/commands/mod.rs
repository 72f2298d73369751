//! Command implementations
//!
//! Each command returns a [`CommandOutput`]; [`execute`] prints it.

pub mod deploy;
pub mod derive;
pub mod publish;
pub mod register;

use crate::{print_json, Cli, Commands};
use anchor_core::{AssetIdentifier, IdentifierEntry, PublishReport, RunReport};
use anchor_registry::{DeploymentReceipt, RegistryOutcome};
use anyhow::Result;
use serde::Serialize;

/// Result of one command
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    /// `publish`
    Published(PublishReport),
    /// `derive` over the artifact
    Identifiers(Vec<IdentifierEntry>),
    /// `derive <KEY>`
    Key {
        key: String,
        identifier: AssetIdentifier,
    },
    /// `deploy --bare`
    Bare(DeploymentReceipt),
    /// `deploy` and `register`
    Run(RunReport),
}

/// Run the parsed command line and return its output
///
/// # Errors
/// Returns the first configuration, publishing or transaction error
pub async fn dispatch(cli: Cli) -> Result<CommandOutput> {
    let config = cli.global.config()?;
    match cli.command {
        Commands::Publish => publish::run(&cli.global, &config).await,
        Commands::Derive(args) => derive::run(args, &config).await,
        Commands::Deploy(args) => deploy::run(args, &cli.global, config).await,
        Commands::Register(args) => register::run(args, &cli.global, config).await,
    }
}

/// Run the parsed command line and print its output
///
/// # Errors
/// Returns the first configuration, publishing or transaction error
pub async fn execute(cli: Cli) -> Result<()> {
    let json = cli.global.json;
    let output = dispatch(cli).await?;
    if json {
        return print_json(&output);
    }
    print_output(&output);
    Ok(())
}

fn print_output(output: &CommandOutput) {
    match output {
        CommandOutput::Published(report) => print_publish_report(report),
        CommandOutput::Identifiers(entries) => {
            for entry in entries {
                println!("{}  {}  {}", entry.identifier, entry.address, entry.name);
            }
        }
        CommandOutput::Key { identifier, .. } => println!("{identifier}"),
        CommandOutput::Bare(receipt) => {
            println!("Deployed {} at {}", receipt.contract, receipt.address);
            println!("  tx: {}", receipt.tx_hash);
        }
        CommandOutput::Run(report) => print_run_report(report),
    }
}

fn print_publish_report(report: &PublishReport) {
    println!(
        "Published {} of {} records to {}",
        report.published,
        report.manifest_entries,
        report.artifact.display()
    );
    for entry in &report.collapsed {
        println!("  {} duplicates {} ({})", entry.key, entry.kept_key, entry.address);
    }
}

fn print_run_report(report: &RunReport) {
    if let Some(publish) = &report.publish {
        print_publish_report(publish);
    }
    match &report.outcome {
        RegistryOutcome::Deployed(receipt) => println!(
            "Deployed {} at {} with {} identifiers",
            receipt.contract, receipt.address, receipt.registered
        ),
        RegistryOutcome::Appended(receipt) => println!(
            "Appended {} identifiers to {} at {}",
            receipt.appended, receipt.contract, receipt.address
        ),
    }
    println!("  tx: {}", report.outcome.tx_hash());
    for id in &report.identifiers {
        println!("  {id}");
    }
}
