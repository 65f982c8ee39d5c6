//! Chain adaptors for the UTXO gateway.
//!
//! This crate turns configuration into live backends. Each supported chain
//! contributes a named `AdaptorFactory`; at startup the configured chain names
//! are looked up in the `AdaptorFactoryTable` and the resulting adaptors are
//! collected into a `ChainRegistry`, which is read-only from then on.
//!
//! # Modules
//!
//! - `factory`: the table of named adaptor constructors
//! - `registry`: the chain name → adaptor mapping and its one-shot builder
//! - `implementations`: concrete adaptors shipped with the gateway

pub mod factory;
pub mod implementations;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use factory::AdaptorFactoryTable;
pub use implementations::bitcoin::{NodeAdaptor, NodeAdaptorFactory};
pub use registry::ChainRegistry;
