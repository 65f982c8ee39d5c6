//! Chain identifiers and the routing capability.

pub const BITCOIN: &str = "bitcoin";
pub const BITCOIN_CASH: &str = "bitcoincash";

/// Message carried by the shared rejection reply when a chain is not registered.
pub const UNSUPPORTED_OPERATION: &str = "Unsupported operation";

/// Implemented by every request; exposes the chain the request is addressed to.
pub trait HasChain {
	fn chain(&self) -> &str;
}
