use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utxo_chains::{AdaptorFactoryTable, ChainRegistry};
use utxo_config::{ConfigLoader, GatewayConfig};
use utxo_core::{install_panic_hook, ChainDispatcher};
use utxo_service::api::ApiServer;
use utxo_service::cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	setup_tracing(&args.log_level, args.log_json)?;

	match args.command {
		Some(Command::Start) | None => start_service(&args).await,
		Some(Command::Validate) => validate_config(&args).await,
	}
}

async fn load_config(args: &Args) -> Result<GatewayConfig> {
	info!("Loading configuration from: {:?}", args.config);

	ConfigLoader::new()
		.with_file(&args.config)
		.load()
		.await
		.context("Failed to load configuration")
}

async fn start_service(args: &Args) -> Result<()> {
	info!("Starting UTXO gateway");

	let config = load_config(args).await?;
	install_panic_hook();

	let factories = AdaptorFactoryTable::builtin();
	let registry =
		ChainRegistry::from_config(&config, &factories).context("Failed to build chain registry")?;
	if registry.is_empty() {
		warn!("No configured chain is supported, every call will be rejected");
	}

	let dispatcher = Arc::new(ChainDispatcher::new(Arc::new(registry)));
	let server = ApiServer::new(config.server.host.clone(), config.server.port, dispatcher);

	info!(
		network = %config.network,
		port = config.server.port,
		"Wallet rpc services start success"
	);

	server
		.run(shutdown_signal())
		.await
		.context("Wallet rpc server failed")?;

	info!("UTXO gateway stopped");
	Ok(())
}

async fn validate_config(args: &Args) -> Result<()> {
	let config = load_config(args).await?;
	let factories = AdaptorFactoryTable::builtin();

	info!("Configuration is valid");
	info!("Network: {}", config.network);
	info!("Listen address: {}:{}", config.server.host, config.server.port);

	for chain in &config.chains {
		if factories.has_factory(chain) {
			info!("  {}: supported", chain);
		} else {
			warn!(
				"  {}: unsupported, will be skipped (supported chains: {:?})",
				chain,
				factories.supported_chains()
			);
		}
	}

	Ok(())
}

fn setup_tracing(log_level: &str, json: bool) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.context("Invalid log level")?;

	let registry = tracing_subscriber::registry().with(env_filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init()?;
	} else {
		registry.with(tracing_subscriber::fmt::layer()).try_init()?;
	}

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!(error = %e, "Failed to listen for Ctrl+C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				error!(error = %e, "Failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received, stopping services...");
}
