//! Ethereum JSON-RPC backend
//!
//! Transactions are sent with `eth_sendTransaction`, so the node (a local
//! development node or a signing proxy) holds the signer's key. Creation
//! bytecode comes from Hardhat-style compiled artifacts on disk.

use crate::abi::{encode_add_assets, encode_deployment};
use crate::backend::{ChainBackend, MinedTransaction};
use crate::error::TransactionFailure;
use crate::mode::{RegistryAttachment, RegistryDeploymentDescriptor};
use crate::types::{Address, TxHash};
use anchor_asset::IdentifierSet;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Target network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Name, for logs
    pub name: String,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Expected chain id; checked before the first transaction when set
    pub chain_id: Option<u64>,
    /// Interval between receipt polls
    pub receipt_poll_interval_ms: u64,
    /// Give up waiting for a receipt after this long
    pub receipt_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "localhost".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: None,
            receipt_poll_interval_ms: 500,
            receipt_timeout_secs: 120,
        }
    }
}

/// Compiled contract artifacts laid out as `<root>/<Name>.sol/<Name>.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifacts {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CompiledContract {
    bytecode: String,
}

impl ContractArtifacts {
    /// Create loader rooted at a directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a contract's artifact
    #[must_use]
    pub fn path_for(&self, contract: &str) -> PathBuf {
        self.root
            .join(format!("{contract}.sol"))
            .join(format!("{contract}.json"))
    }

    /// Creation bytecode of a contract
    ///
    /// # Errors
    /// `TransactionFailure::ContractArtifact` if the file is missing, malformed
    /// or carries no bytecode
    pub async fn bytecode(&self, contract: &str) -> Result<Vec<u8>, TransactionFailure> {
        let path = self.path_for(contract);
        let fail = |reason: String| TransactionFailure::ContractArtifact {
            contract: contract.to_string(),
            path: path.clone(),
            reason,
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| fail(e.to_string()))?;
        let compiled: CompiledContract =
            serde_json::from_str(&text).map_err(|e| fail(e.to_string()))?;
        let code = decode_hex_data(&compiled.bytecode).map_err(fail)?;
        if code.is_empty() {
            return Err(fail("empty bytecode (abstract contract or interface?)".to_string()));
        }
        Ok(code)
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn decode_hex_data(text: &str) -> Result<Vec<u8>, String> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| format!("bad hex: {e}"))
}

/// Parse a JSON-RPC hex quantity such as `0x7a69`
///
/// # Errors
/// `TransactionFailure::MalformedResponse` if the text is not a hex quantity
pub fn parse_quantity(text: &str) -> Result<u64, TransactionFailure> {
    text.strip_prefix("0x")
        .and_then(|digits| u64::from_str_radix(digits, 16).ok())
        .ok_or_else(|| TransactionFailure::MalformedResponse(format!("bad quantity: {text}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    status: Option<String>,
    contract_address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Interpret a mined receipt
///
/// # Errors
/// - `TransactionFailure::Reverted` for status `0x0`
/// - `TransactionFailure::MalformedResponse` if the receipt cannot be read
pub fn interpret_receipt(tx_hash: TxHash, receipt: Value) -> Result<MinedTransaction, TransactionFailure> {
    let receipt: RpcReceipt = serde_json::from_value(receipt)
        .map_err(|e| TransactionFailure::MalformedResponse(format!("receipt: {e}")))?;

    if let Some(status) = receipt.status.as_deref() {
        if parse_quantity(status)? == 0 {
            return Err(TransactionFailure::Reverted { tx_hash });
        }
    }

    Ok(MinedTransaction {
        tx_hash,
        contract_address: receipt.contract_address,
    })
}

/// [`ChainBackend`] over Ethereum JSON-RPC
#[derive(Debug)]
pub struct JsonRpcBackend {
    client: Client,
    network: NetworkConfig,
    artifacts: ContractArtifacts,
    next_id: AtomicU64,
}

impl JsonRpcBackend {
    /// Create backend for a network
    ///
    /// # Errors
    /// `TransactionFailure::Transport` if the HTTP client cannot be built
    pub fn new(network: NetworkConfig, artifacts: ContractArtifacts) -> Result<Self, TransactionFailure> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| TransactionFailure::Transport {
                endpoint: network.rpc_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            network,
            artifacts,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, TransactionFailure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let transport = |source| TransactionFailure::Transport {
            endpoint: self.network.rpc_url.clone(),
            source,
        };

        let response = self
            .client
            .post(&self.network.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(TransactionFailure::HttpStatus {
                endpoint: self.network.rpc_url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let response: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| TransactionFailure::MalformedResponse(format!("{e}: {body}")))?;

        if let Some(error) = response.error {
            return Err(TransactionFailure::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Check the node's chain id against the configured one
    ///
    /// # Errors
    /// `TransactionFailure::ChainMismatch` if they differ
    pub async fn verify_chain(&self) -> Result<(), TransactionFailure> {
        let Some(expected) = self.network.chain_id else {
            return Ok(());
        };
        let reported = self.call("eth_chainId", json!([])).await?;
        let actual = reported
            .as_str()
            .ok_or_else(|| TransactionFailure::MalformedResponse(reported.to_string()))
            .and_then(parse_quantity)?;
        if actual != expected {
            return Err(TransactionFailure::ChainMismatch { expected, actual });
        }
        Ok(())
    }

    async fn send_transaction(&self, tx: Value) -> Result<MinedTransaction, TransactionFailure> {
        self.verify_chain().await?;

        let hash = self.call("eth_sendTransaction", json!([tx])).await?;
        let tx_hash: TxHash = hash
            .as_str()
            .ok_or_else(|| TransactionFailure::MalformedResponse(hash.to_string()))?
            .parse()
            .map_err(|e| TransactionFailure::MalformedResponse(format!("{e}")))?;

        tracing::info!("Submitted {} on {}, waiting for receipt", tx_hash, self.network.name);
        self.wait_for_receipt(tx_hash).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<MinedTransaction, TransactionFailure> {
        let interval = Duration::from_millis(self.network.receipt_poll_interval_ms.max(1));
        let timeout = Duration::from_secs(self.network.receipt_timeout_secs);
        let started = tokio::time::Instant::now();

        loop {
            let receipt = self
                .call("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
                .await?;
            if !receipt.is_null() {
                return interpret_receipt(tx_hash, receipt);
            }
            if started.elapsed() >= timeout {
                return Err(TransactionFailure::ReceiptTimeout {
                    tx_hash,
                    waited_secs: self.network.receipt_timeout_secs,
                });
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[async_trait::async_trait]
impl ChainBackend for JsonRpcBackend {
    async fn deploy(
        &self,
        descriptor: &RegistryDeploymentDescriptor,
    ) -> Result<MinedTransaction, TransactionFailure> {
        let bytecode = self.artifacts.bytecode(&descriptor.contract).await?;
        let data = encode_deployment(&bytecode, descriptor.args.identifiers());
        let tx = json!({
            "from": descriptor.deployer.to_string(),
            "data": format!("0x{}", hex::encode(data)),
        });

        let mined = self.send_transaction(tx).await?;
        if mined.contract_address.is_none() {
            return Err(TransactionFailure::MissingContractAddress {
                tx_hash: mined.tx_hash,
            });
        }
        Ok(mined)
    }

    async fn append(
        &self,
        attachment: &RegistryAttachment,
        identifiers: &IdentifierSet,
    ) -> Result<MinedTransaction, TransactionFailure> {
        let code = self
            .call("eth_getCode", json!([attachment.address.to_string(), "latest"]))
            .await?;
        if matches!(code.as_str(), None | Some("0x" | "0x0")) {
            return Err(TransactionFailure::UnknownContract(attachment.address));
        }

        let tx = json!({
            "from": attachment.signer.to_string(),
            "to": attachment.address.to_string(),
            "data": format!("0x{}", hex::encode(encode_add_assets(identifiers))),
        });
        self.send_transaction(tx).await
    }

    async fn identifiers(&self, _address: &Address) -> Result<IdentifierSet, TransactionFailure> {
        Err(TransactionFailure::Unsupported {
            backend: "json-rpc",
            operation: "reading registered identifiers",
        })
    }

    fn network(&self) -> String {
        self.network.name.clone()
    }
}
