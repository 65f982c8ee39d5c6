//! Shared types for the UTXO gateway.
//!
//! This crate holds everything the other gateway crates agree on:
//!
//! - `utxo`: request/response messages for every wallet operation
//! - `common`: the `ReturnCode` carried by every reply and the `Reply` capability
//! - `chain`: chain identifiers and the `HasChain` capability used for routing
//! - `adaptor`: the contract every per-chain backend implements, and its factory
//! - `configs`: the gateway configuration model
//! - `errors` / `status`: adaptor errors and the transport-level status

pub mod adaptor;
pub mod chain;
pub mod common;
pub mod configs;
pub mod errors;
pub mod status;
pub mod utxo;

pub use adaptor::*;
pub use chain::*;
pub use common::*;
pub use configs::*;
pub use errors::*;
pub use status::*;
pub use utxo::*;
