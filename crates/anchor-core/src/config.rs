//! Run configuration
//!
//! Everything a run needs from its environment is spelled out here and
//! validated once, at the invocation boundary, before any I/O: the target
//! network, the signer identity and the content store endpoint, plus the
//! file paths and the registry contract.

use crate::error::ConfigError;
use anchor_publish::ContentStoreEndpoint;
use anchor_registry::{Address, NetworkConfig, DEFAULT_CONTRACT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "anchor.toml";

/// Account that signs transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Signer address; the node must hold its key
    pub address: Option<Address>,
}

/// Input and output files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Manifest of asset records
    pub manifest: PathBuf,
    /// Address → record artifact written by publishing
    pub artifact: PathBuf,
    /// Root of compiled contract artifacts
    pub contract_artifacts: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("artwork.json"),
            artifact: PathBuf::from("uploaded.json"),
            contract_artifacts: PathBuf::from("artifacts/contracts"),
        }
    }
}

/// Registry contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Contract name, as compiled
    pub contract: String,
    /// Deployed registry, for incremental registration
    pub address: Option<Address>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT.to_string(),
            address: None,
        }
    }
}

/// Full run configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub network: NetworkConfig,
    pub signer: SignerConfig,
    pub content_store: ContentStoreEndpoint,
    pub paths: PathsConfig,
    pub registry: RegistryConfig,
}

impl AnchorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on syntax or type errors
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` on syntax or type errors
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Read a TOML file if it exists, defaults otherwise
    ///
    /// # Errors
    /// Same as [`AnchorConfig::load`] for an existing file
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// With signer
    #[inline]
    #[must_use]
    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer.address = Some(signer);
        self
    }

    /// With content store endpoint
    #[inline]
    #[must_use]
    pub fn with_content_store(mut self, endpoint: ContentStoreEndpoint) -> Self {
        self.content_store = endpoint;
        self
    }

    /// With manifest and artifact paths
    #[inline]
    #[must_use]
    pub fn with_paths(mut self, manifest: impl Into<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        self.paths.manifest = manifest.into();
        self.paths.artifact = artifact.into();
        self
    }

    /// Check the fields a publish-only run uses
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad field
    pub fn validate_publishing(&self) -> Result<(), ConfigError> {
        let store = &self.content_store;
        let host_ok = match store.host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            // IPv6 literal
            Some(ip) => {
                !ip.is_empty() && ip.chars().all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '.'))
            }
            None => {
                let bad_char = |c: char| matches!(c, '/' | ':' | '[' | ']') || c.is_whitespace();
                !store.host.trim().is_empty() && !store.host.contains(bad_char)
            }
        };
        if !host_ok {
            return Err(ConfigError::invalid("content_store.host", "must be a bare host name"));
        }
        if store.port == 0 {
            return Err(ConfigError::invalid("content_store.port", "must be non-zero"));
        }
        if !store.api_path.is_empty() && !store.api_path.starts_with('/') {
            return Err(ConfigError::invalid("content_store.api_path", "must start with '/'"));
        }
        if store.max_payload_bytes == 0 {
            return Err(ConfigError::invalid("content_store.max_payload_bytes", "must be non-zero"));
        }
        if store.timeout_secs == 0 {
            return Err(ConfigError::invalid("content_store.timeout_secs", "must be non-zero"));
        }
        check_path("paths.manifest", &self.paths.manifest)?;
        check_path("paths.artifact", &self.paths.artifact)?;
        Ok(())
    }

    /// Check every field a registration run uses and return the signer
    ///
    /// # Errors
    /// - `ConfigError::MissingSigner` if no signer is configured
    /// - `ConfigError::Invalid` naming the first bad field
    pub fn validate_registration(&self) -> Result<Address, ConfigError> {
        self.validate_publishing()?;

        let network = &self.network;
        if network.name.trim().is_empty() {
            return Err(ConfigError::invalid("network.name", "must not be empty"));
        }
        if !(network.rpc_url.starts_with("http://") || network.rpc_url.starts_with("https://")) {
            return Err(ConfigError::invalid("network.rpc_url", "must be an http(s) URL"));
        }
        if network.receipt_poll_interval_ms == 0 {
            return Err(ConfigError::invalid("network.receipt_poll_interval_ms", "must be non-zero"));
        }
        if network.receipt_timeout_secs == 0 {
            return Err(ConfigError::invalid("network.receipt_timeout_secs", "must be non-zero"));
        }

        let contract = &self.registry.contract;
        if contract.is_empty() || !contract.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::invalid(
                "registry.contract",
                "must be a Solidity identifier",
            ));
        }
        if self.registry.address.is_some_and(|a| a.is_zero()) {
            return Err(ConfigError::invalid("registry.address", "must not be the zero address"));
        }

        match self.signer.address {
            None => Err(ConfigError::MissingSigner),
            Some(signer) if signer.is_zero() => {
                Err(ConfigError::invalid("signer.address", "must not be the zero address"))
            }
            Some(signer) => Ok(signer),
        }
    }
}

fn check_path(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    Ok(())
}
