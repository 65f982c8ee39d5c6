//! Error types for adaptors and registry construction.

use thiserror::Error;

pub type AdaptorResult<T> = std::result::Result<T, AdaptorError>;

/// Errors returned by a chain adaptor or raised while constructing one.
#[derive(Error, Debug)]
pub enum AdaptorError {
	#[error("RPC error: {0}")]
	Rpc(String),

	#[error("Explorer error: {0}")]
	Explorer(String),

	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

/// Errors raised while building the chain registry at startup.
#[derive(Error, Debug)]
pub enum RegistryError {
	#[error("Chain {0} already registered")]
	Duplicate(String),

	#[error("Failed to set up chain {chain}: {source}")]
	Construction {
		chain: String,
		#[source]
		source: AdaptorError,
	},
}
