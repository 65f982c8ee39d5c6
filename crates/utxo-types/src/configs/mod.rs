//! Configuration model for the gateway.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
	/// Network the backends are connected to ("mainnet", "testnet", ...)
	#[serde(default = "default_network")]
	pub network: String,
	/// Chains to activate, in order
	pub chains: Vec<String>,
	/// Listener settings
	#[serde(default)]
	pub server: ServerConfig,
	/// Per-chain backend connection parameters, keyed by chain name
	#[serde(default)]
	pub wallet_node: HashMap<String, NodeConfig>,
}

impl GatewayConfig {
	/// Connection parameters for a chain, if present.
	pub fn node(&self, chain: &str) -> Option<&NodeConfig> {
		self.wallet_node.get(chain)
	}
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			network: default_network(),
			chains: Vec::new(),
			server: ServerConfig::default(),
			wallet_node: HashMap::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

/// Node RPC and block-explorer parameters for one chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
	/// Node RPC host, with or without scheme
	pub rpc_url: String,
	#[serde(default)]
	pub rpc_user: String,
	#[serde(default)]
	pub rpc_pass: String,
	/// Block-explorer base URL
	#[serde(default)]
	pub data_api_url: String,
	/// Block-explorer access key; the explorer is used only when both the
	/// URL and the key are set
	#[serde(default)]
	pub data_api_key: String,
	/// Request timeout for backend calls
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

impl Default for NodeConfig {
	fn default() -> Self {
		Self {
			rpc_url: String::new(),
			rpc_user: String::new(),
			rpc_pass: String::new(),
			data_api_url: String::new(),
			data_api_key: String::new(),
			timeout_secs: default_timeout_secs(),
		}
	}
}

fn default_network() -> String {
	"mainnet".to_string()
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	8389
}

fn default_timeout_secs() -> u64 {
	15
}
