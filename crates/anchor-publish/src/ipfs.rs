//! IPFS HTTP API publisher
//!
//! Talks to the `add` endpoint of an IPFS node or pinning gateway. Only
//! host, port and protocol are configurable; no authentication.

use crate::error::PublishFailure;
use crate::publisher::ContentPublisher;
use anchor_asset::ContentAddress;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Transport protocol of the content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Https => "https",
        })
    }
}

/// Location of the content store API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStoreEndpoint {
    /// http or https
    pub protocol: Protocol,
    /// Host name
    pub host: String,
    /// API port
    pub port: u16,
    /// Path prefix of the API
    pub api_path: String,
    /// Largest payload accepted before any round trip
    pub max_payload_bytes: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl ContentStoreEndpoint {
    /// Create endpoint with default limits
    #[must_use]
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Base URL, e.g. `https://ipfs.infura.io:5001/api/v0`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol,
            self.host,
            self.port,
            self.api_path.trim_end_matches('/')
        )
    }

    /// URL of the `add` operation
    #[must_use]
    pub fn add_url(&self) -> String {
        format!("{}/add", self.base_url())
    }
}

impl Default for ContentStoreEndpoint {
    fn default() -> Self {
        Self {
            protocol: Protocol::Https,
            host: "ipfs.infura.io".to_string(),
            port: 5001,
            api_path: "/api/v0".to_string(),
            max_payload_bytes: 1024 * 1024, // 1MB
            timeout_secs: 30,
        }
    }
}

impl Display for ContentStoreEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl FromStr for ContentStoreEndpoint {
    type Err = PublishFailure;

    /// Parse `proto://host[:port][/api/path]`; omitted parts keep their defaults
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| PublishFailure::InvalidEndpoint {
            input: s.to_string(),
            reason,
        };

        let (scheme, rest) = s.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
        let protocol = match scheme {
            "http" => Protocol::Http,
            "https" => Protocol::Https,
            _ => return Err(invalid("scheme must be http or https")),
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        // A bracketed IPv6 literal only has its port after the closing ']'
        let port_from = authority.rfind(']').map_or(0, |i| i + 1);
        let (host, port) = match authority[port_from..].rfind(':') {
            Some(i) => {
                let (host, port) = authority.split_at(port_from + i);
                (host, port[1..].parse().map_err(|_| invalid("bad port"))?)
            }
            None => (authority, Self::default().port),
        };
        if host.starts_with('[') != host.ends_with(']') {
            return Err(invalid("unbalanced IPv6 brackets"));
        }
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let mut endpoint = Self::new(protocol, host, port);
        if !path.trim_end_matches('/').is_empty() {
            endpoint.api_path = path.trim_end_matches('/').to_string();
        }
        Ok(endpoint)
    }
}

/// Response of `POST /api/v0/add`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

/// Extract the content address from an `add` response body
///
/// The API streams one JSON object per added file; the last one is the
/// payload itself.
///
/// # Errors
/// - `PublishFailure::MalformedResponse` if no line parses
/// - `PublishFailure::InvalidAddress` if the hash is unusable
pub fn parse_add_response(body: &str) -> Result<ContentAddress, PublishFailure> {
    let line = body
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| PublishFailure::MalformedResponse("empty body".to_string()))?;

    let parsed: AddResponse = serde_json::from_str(line)
        .map_err(|e| PublishFailure::MalformedResponse(format!("{e}: {line}")))?;

    Ok(ContentAddress::new(parsed.hash)?)
}

/// Connection and timeout errors mean the store is unreachable
fn transport_failure(endpoint: &str, source: reqwest::Error) -> PublishFailure {
    if source.is_connect() || source.is_timeout() {
        PublishFailure::unavailable(endpoint, source.to_string())
    } else {
        PublishFailure::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

/// Publisher backed by the IPFS HTTP API
#[derive(Debug, Clone)]
pub struct IpfsPublisher {
    client: Client,
    endpoint: ContentStoreEndpoint,
}

impl IpfsPublisher {
    /// Create publisher for an endpoint
    ///
    /// # Errors
    /// Returns `PublishFailure::Transport` if the HTTP client cannot be built
    pub fn new(endpoint: ContentStoreEndpoint) -> Result<Self, PublishFailure> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|source| PublishFailure::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ContentStoreEndpoint {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ContentPublisher for IpfsPublisher {
    async fn add(&self, payload: Vec<u8>) -> Result<ContentAddress, PublishFailure> {
        let limit = self.endpoint.max_payload_bytes;
        if payload.len() > limit {
            return Err(PublishFailure::PayloadTooLarge {
                size: payload.len(),
                limit,
            });
        }

        let url = self.endpoint.add_url();
        let form = Form::new().part("file", Part::bytes(payload).file_name("asset.json"));

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| transport_failure(&url, source))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| transport_failure(&url, source))?;

        if !status.is_success() {
            return Err(PublishFailure::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let address = parse_add_response(&body)?;
        tracing::debug!("{} assigned {}", url, address);
        Ok(address)
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}
