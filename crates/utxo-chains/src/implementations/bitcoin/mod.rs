//! Bitcoin-family adaptor backed by a full node's JSON-RPC interface.
//!
//! The same adaptor serves bitcoin and bitcoin cash. The chains differ only in
//! how fee rates are estimated and in their explorer symbol, captured by
//! `NodeFlavor`.

mod adaptor;
pub mod client;
pub mod explorer;
mod types;

pub use adaptor::{NodeAdaptor, NodeFlavor};
pub use client::RpcClient;
pub use explorer::ExplorerClient;

use std::sync::Arc;
use utxo_types::{
	AdaptorFactory, AdaptorResult, ChainAdaptor, GatewayConfig, BITCOIN, BITCOIN_CASH,
};

/// Factory building a `NodeAdaptor` from the chain's `wallet_node` section.
#[derive(Debug, Clone, Copy)]
pub struct NodeAdaptorFactory {
	chain: &'static str,
	flavor: NodeFlavor,
}

impl NodeAdaptorFactory {
	pub fn bitcoin() -> Self {
		Self {
			chain: BITCOIN,
			flavor: NodeFlavor::Bitcoin,
		}
	}

	pub fn bitcoin_cash() -> Self {
		Self {
			chain: BITCOIN_CASH,
			flavor: NodeFlavor::BitcoinCash,
		}
	}
}

impl AdaptorFactory for NodeAdaptorFactory {
	fn chain_name(&self) -> &'static str {
		self.chain
	}

	fn create_adaptor(&self, config: &GatewayConfig) -> AdaptorResult<Arc<dyn ChainAdaptor>> {
		let adaptor = NodeAdaptor::new(self.chain, self.flavor, config)?;
		Ok(Arc::new(adaptor))
	}
}
