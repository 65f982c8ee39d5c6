//! Table of named adaptor constructors.
//!
//! Each backend module supplies a factory keyed by the chain name it serves.
//! The table is consulted only while the registry is being built.

use crate::implementations::bitcoin::NodeAdaptorFactory;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use utxo_types::{AdaptorFactory, AdaptorResult, ChainAdaptor, GatewayConfig};

/// Registry of adaptor factories, keyed by chain name.
pub struct AdaptorFactoryTable {
	factories: HashMap<String, Box<dyn AdaptorFactory>>,
}

impl AdaptorFactoryTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self {
			factories: HashMap::new(),
		}
	}

	/// Creates a table holding every adaptor shipped with the gateway.
	pub fn builtin() -> Self {
		let mut table = Self::new();
		table.register_factory(NodeAdaptorFactory::bitcoin());
		table.register_factory(NodeAdaptorFactory::bitcoin_cash());
		table
	}

	/// Registers a factory under its own chain name, replacing any previous one.
	pub fn register_factory<F>(&mut self, factory: F)
	where
		F: AdaptorFactory + 'static,
	{
		self.factories
			.insert(factory.chain_name().to_string(), Box::new(factory));
	}

	/// Registers a plain constructor function under `chain_name`.
	pub fn register_fn<F>(&mut self, chain_name: &'static str, build: F)
	where
		F: Fn(&GatewayConfig) -> AdaptorResult<Arc<dyn ChainAdaptor>> + Send + Sync + 'static,
	{
		self.register_factory(FnFactory { chain_name, build });
	}

	pub fn get(&self, chain_name: &str) -> Option<&dyn AdaptorFactory> {
		self.factories.get(chain_name).map(|f| f.as_ref())
	}

	pub fn has_factory(&self, chain_name: &str) -> bool {
		self.factories.contains_key(chain_name)
	}

	/// Names of all chains a factory exists for, sorted.
	pub fn supported_chains(&self) -> Vec<String> {
		let mut chains: Vec<String> = self.factories.keys().cloned().collect();
		chains.sort();
		chains
	}
}

impl Default for AdaptorFactoryTable {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for AdaptorFactoryTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdaptorFactoryTable")
			.field("factories", &self.supported_chains())
			.finish()
	}
}

/// Adapts a constructor closure to the `AdaptorFactory` trait.
struct FnFactory<F> {
	chain_name: &'static str,
	build: F,
}

impl<F> AdaptorFactory for FnFactory<F>
where
	F: Fn(&GatewayConfig) -> AdaptorResult<Arc<dyn ChainAdaptor>> + Send + Sync,
{
	fn chain_name(&self) -> &'static str {
		self.chain_name
	}

	fn create_adaptor(&self, config: &GatewayConfig) -> AdaptorResult<Arc<dyn ChainAdaptor>> {
		(self.build)(config)
	}
}
