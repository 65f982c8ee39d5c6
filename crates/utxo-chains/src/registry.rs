//! Registry of live chain adaptors.
//!
//! The `ChainRegistry` maps chain names to initialized adaptors. It is built
//! once at startup, then moved into an `Arc` and only read from, so lookups
//! need no synchronization while calls are being served.

use crate::factory::AdaptorFactoryTable;
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, error, info, warn};
use utxo_types::{ChainAdaptor, GatewayConfig, RegistryError};

/// Mapping from chain name to the adaptor bound to it.
pub struct ChainRegistry {
	adaptors: HashMap<String, Arc<dyn ChainAdaptor>>,
}

impl ChainRegistry {
	/// Creates a new empty registry.
	pub fn new() -> Self {
		Self {
			adaptors: HashMap::new(),
		}
	}

	/// Registers an adaptor under the chain name it reports.
	///
	/// # Errors
	///
	/// Returns `RegistryError::Duplicate` if that chain is already registered.
	pub fn register(&mut self, adaptor: Arc<dyn ChainAdaptor>) -> Result<(), RegistryError> {
		let chain = adaptor.chain_name().to_string();
		self.insert(chain, adaptor)
	}

	fn insert(&mut self, chain: String, adaptor: Arc<dyn ChainAdaptor>) -> Result<(), RegistryError> {
		if self.adaptors.contains_key(&chain) {
			return Err(RegistryError::Duplicate(chain));
		}

		info!(chain = %chain, "Registered chain adaptor");
		self.adaptors.insert(chain, adaptor);
		Ok(())
	}

	/// Retrieves the adaptor for a chain, if registered.
	pub fn get(&self, chain: &str) -> Option<Arc<dyn ChainAdaptor>> {
		self.adaptors.get(chain).cloned()
	}

	pub fn contains(&self, chain: &str) -> bool {
		self.adaptors.contains_key(chain)
	}

	/// Names of all registered chains, sorted.
	pub fn chains(&self) -> Vec<String> {
		let mut chains: Vec<String> = self.adaptors.keys().cloned().collect();
		chains.sort();
		chains
	}

	pub fn len(&self) -> usize {
		self.adaptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adaptors.is_empty()
	}

	/// Builds the registry for every configured chain the factory table knows.
	///
	/// Chains are visited in configuration order. A configured chain without a
	/// factory is logged and skipped. A chain listed twice is built once.
	///
	/// # Errors
	///
	/// Returns `RegistryError::Construction` as soon as a recognized chain's
	/// factory fails; the gateway must not serve with that chain missing.
	pub fn from_config(
		config: &GatewayConfig,
		factories: &AdaptorFactoryTable,
	) -> Result<Self, RegistryError> {
		let mut registry = Self::new();

		for chain in &config.chains {
			if registry.contains(chain) {
				warn!(chain = %chain, "Chain listed more than once, skipping repeat");
				continue;
			}

			let Some(factory) = factories.get(chain) else {
				warn!(
					chain = %chain,
					supported_chains = ?factories.supported_chains(),
					"Unsupported chain"
				);
				continue;
			};

			debug!(chain = %chain, "Setting up chain adaptor");
			let adaptor = factory.create_adaptor(config).map_err(|source| {
				error!(chain = %chain, error = %source, "Failed to set up chain");
				RegistryError::Construction {
					chain: chain.clone(),
					source,
				}
			})?;

			registry.insert(chain.clone(), adaptor)?;
		}

		info!(chains = ?registry.chains(), "Chain registry ready");
		Ok(registry)
	}
}

impl Default for ChainRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for ChainRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChainRegistry")
			.field("adaptors", &self.chains())
			.finish()
	}
}
