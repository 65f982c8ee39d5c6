//! Configuration loading from files and environment.

use crate::ConfigError;
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use utxo_types::configs::GatewayConfig;

/// On-disk configuration formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Yaml,
	Json,
}

impl ConfigFormat {
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(ConfigFormat::Toml),
			Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
			Some("json") => Ok(ConfigFormat::Json),
			_ => Err(ConfigError::UnsupportedFormat(
				path.to_string_lossy().to_string(),
			)),
		}
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "UTXO_GATEWAY_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration.
	pub async fn load(&self) -> Result<GatewayConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		let mut config = self.load_from_file(file_path).await?;

		self.apply_env_overrides(&mut config)?;

		validate_config(&config)?;

		info!(
			chains = ?config.chains,
			network = %config.network,
			"Configuration loaded from {:?}",
			file_path
		);
		Ok(config)
	}

	async fn load_from_file(&self, file_path: &Path) -> Result<GatewayConfig, ConfigError> {
		let format = ConfigFormat::from_path(file_path)?;

		if !tokio::fs::try_exists(file_path).await? {
			return Err(ConfigError::FileNotFound(
				file_path.to_string_lossy().to_string(),
			));
		}
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = substitute_env_vars(&content)?;

		parse_str(&substituted_content, format)
	}

	fn apply_env_overrides(&self, config: &mut GatewayConfig) -> Result<(), ConfigError> {
		if let Ok(host) = env::var(format!("{}HOST", self.env_prefix)) {
			debug!("Overriding server host from environment");
			config.server.host = host;
		}

		if let Ok(port) = env::var(format!("{}PORT", self.env_prefix)) {
			debug!("Overriding server port from environment");
			config.server.port = port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid port: {}", e)))?;
		}

		if let Ok(chains) = env::var(format!("{}CHAINS", self.env_prefix)) {
			debug!("Overriding chain list from environment");
			config.chains = chains
				.split(',')
				.map(|c| c.trim().to_string())
				.filter(|c| !c.is_empty())
				.collect();
		}

		Ok(())
	}
}

/// Parses configuration text in the given format.
pub fn parse_str(contents: &str, format: ConfigFormat) -> Result<GatewayConfig, ConfigError> {
	match format {
		ConfigFormat::Toml => {
			toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		ConfigFormat::Yaml => {
			serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		ConfigFormat::Json => {
			serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
	}
}

/// Replaces every `${VAR_NAME}` with the value of that environment variable.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Checks the structural constraints of a configuration.
///
/// Whether a configured chain has a backend is decided later by the
/// registry builder, not here.
pub fn validate_config(config: &GatewayConfig) -> Result<(), ConfigError> {
	if config.chains.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one chain must be configured".to_string(),
		));
	}

	if config.chains.iter().any(|c| c.trim().is_empty()) {
		return Err(ConfigError::ValidationError(
			"Chain names must not be empty".to_string(),
		));
	}

	if config.server.port == 0 {
		return Err(ConfigError::ValidationError(
			"Server port must be non-zero".to_string(),
		));
	}

	for (chain, node) in &config.wallet_node {
		if node.rpc_url.trim().is_empty() {
			return Err(ConfigError::ValidationError(format!(
				"wallet_node.{} has an empty rpc_url",
				chain
			)));
		}
	}

	Ok(())
}
