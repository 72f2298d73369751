//! # anchor-cli
//!
//! Command-line interface for the asset registration pipeline.
//!
//! ## Commands
//!
//! - `anchor publish` - publish the manifest and write the artifact
//! - `anchor derive` - print identifiers for the artifact (or one key)
//! - `anchor deploy` - publish, derive, deploy a registry seeded with them
//! - `anchor register` - publish, derive, append to a deployed registry
//!
//! ## Configuration
//!
//! Settings come from `anchor.toml` (optional) and are overridden by flags.
//! `RUST_LOG` overrides the verbosity flags.

#![warn(unreachable_pub)]
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

pub mod commands;

use anchor_core::{AnchorConfig, ConfigError, Target, DEFAULT_CONFIG_FILE};
use anchor_publish::ContentStoreEndpoint;
use anchor_registry::Address;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Publish asset metadata and register its identifiers on chain
#[derive(Debug, Parser)]
#[command(name = "anchor", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Manifest of asset records
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Address → record artifact
    #[arg(long, global = true)]
    pub artifact: Option<PathBuf>,

    /// JSON-RPC endpoint of the node
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Account that signs transactions (held by the node)
    #[arg(long, global = true)]
    pub signer: Option<Address>,

    /// Content store URL, e.g. http://127.0.0.1:5001
    #[arg(long, global = true)]
    pub content_store: Option<ContentStoreEndpoint>,

    /// Use an in-memory content store and chain
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    /// Load the config file and apply flag overrides
    ///
    /// # Errors
    /// `ConfigError` if the file exists but cannot be read or parsed
    pub fn config(&self) -> Result<AnchorConfig, ConfigError> {
        let mut config = AnchorConfig::load_or_default(&self.config)?;
        if let Some(manifest) = &self.manifest {
            config.paths.manifest.clone_from(manifest);
        }
        if let Some(artifact) = &self.artifact {
            config.paths.artifact.clone_from(artifact);
        }
        if let Some(rpc_url) = &self.rpc_url {
            config.network.rpc_url.clone_from(rpc_url);
        }
        if let Some(signer) = self.signer {
            config.signer.address = Some(signer);
        }
        if let Some(endpoint) = &self.content_store {
            config.content_store = ContentStoreEndpoint {
                max_payload_bytes: config.content_store.max_payload_bytes,
                timeout_secs: config.content_store.timeout_secs,
                ..endpoint.clone()
            };
        }
        Ok(config)
    }

    /// Live or dry-run backends
    #[inline]
    #[must_use]
    pub fn target(&self) -> Target {
        Target::from_dry_run(self.dry_run)
    }
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Publish the manifest and write the artifact
    Publish,
    /// Print the identifier of every address in the artifact
    Derive(commands::derive::DeriveArgs),
    /// Deploy a registry seeded with the manifest's identifiers
    Deploy(commands::deploy::DeployArgs),
    /// Append the manifest's identifiers to a deployed registry
    Register(commands::register::RegisterArgs),
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Default filter for a verbosity count
#[must_use]
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; logs go to stderr
pub fn init_logging(verbose: u8, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}

/// One-line report of a failed command
///
/// Library errors already embed their source in their message, so a cause
/// is appended only when the text so far does not contain it.
#[must_use]
pub fn failure_message(error: &anyhow::Error) -> String {
    let mut message = format!("error: {error}");
    for cause in error.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message.push_str(": ");
            message.push_str(&cause);
        }
    }
    message
}

/// Print `value` as pretty JSON on stdout
///
/// # Errors
/// Returns an error if `value` cannot be serialized
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "anchor",
            "deploy",
            "--dry-run",
            "--signer",
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "-vv",
            "--log-format",
            "json",
        ]);

        assert!(cli.global.dry_run);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.log_format, LogFormat::Json);
        assert_eq!(cli.global.target(), Target::DryRun);
        assert!(matches!(cli.command, Commands::Deploy(_)));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchor.toml");
        std::fs::write(
            &path,
            "[paths]\nmanifest = \"artworkSingle.json\"\n[content_store]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "anchor",
            "--config",
            path.to_str().unwrap(),
            "--artifact",
            "out.json",
            "--content-store",
            "http://127.0.0.1:5001",
            "--rpc-url",
            "http://127.0.0.1:9545",
            "publish",
        ]);
        let config = cli.global.config().unwrap();

        assert_eq!(config.paths.manifest, PathBuf::from("artworkSingle.json"));
        assert_eq!(config.paths.artifact, PathBuf::from("out.json"));
        assert_eq!(config.content_store.host, "127.0.0.1");
        assert_eq!(config.content_store.timeout_secs, 5);
        assert_eq!(config.network.rpc_url, "http://127.0.0.1:9545");
    }

    #[test]
    fn malformed_signer_is_rejected() {
        let result = Cli::try_parse_from(["anchor", "--signer", "0xabc", "publish"]);
        assert!(result.is_err());
    }

    #[test]
    fn failure_message_keeps_context_and_cause_once() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = anyhow::Error::new(io).context("cannot derive identifiers from uploaded.json");
        assert_eq!(
            failure_message(&error),
            "error: cannot derive identifiers from uploaded.json: no such file"
        );

        let repeated = anyhow::anyhow!("bad key").context("config parse error: bad key");
        assert_eq!(failure_message(&repeated), "error: config parse error: bad key");
    }

    #[test]
    fn verbosity_filters() {
        assert_eq!(default_filter(0), "info");
        assert_eq!(default_filter(1), "debug");
        assert_eq!(default_filter(5), "trace");
    }
}
