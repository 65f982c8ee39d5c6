//! Configuration loading for the UTXO gateway.
//!
//! Reads a `GatewayConfig` from a TOML, YAML or JSON file, substitutes
//! `${VAR}` references from the environment, applies prefixed environment
//! overrides and validates the result.

use thiserror::Error;

pub mod loader;

pub use loader::{parse_str, validate_config, ConfigFormat, ConfigLoader};
pub use utxo_types::configs::{GatewayConfig, NodeConfig, ServerConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
