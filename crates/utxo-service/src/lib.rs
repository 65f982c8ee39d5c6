//! Service layer of the UTXO gateway.
//!
//! This crate exposes the dispatcher over HTTP and provides the command-line
//! entry point.
//!
//! # Components
//!
//! - `api`: the wallet service routes, the health endpoint and the server
//! - `cli`: command-line arguments

pub mod api;
pub mod cli;
