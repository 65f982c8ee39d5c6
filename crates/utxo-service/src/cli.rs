//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "utxo-gateway")]
#[command(about = "UTXO wallet RPC gateway", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to configuration file
	#[arg(
		short,
		long,
		value_name = "FILE",
		env = "UTXO_GATEWAY_CONFIG",
		default_value = "config.toml"
	)]
	pub config: PathBuf,

	/// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
	#[arg(long, env = "UTXO_GATEWAY_LOG_LEVEL", default_value = "info")]
	pub log_level: String,

	/// Emit logs as JSON lines
	#[arg(long)]
	pub log_json: bool,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Start the gateway (default)
	Start,
	/// Validate the configuration file and report which chains are recognized
	Validate,
}
