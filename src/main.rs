//! Ledger gateway binary.
//!
//! Loads the gateway configuration, builds the adapter registry, probes
//! each configured ledger node and then waits for shutdown. The REST
//! surface that marshals external requests into the registry lives
//! outside this crate.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{info, warn};

use ledger_gateway::{bootstrap, models::GatewayConfig, utils::logging::setup_logging};

#[derive(Parser)]
#[command(name = "ledger-gateway", about = "Blockchain-agnostic adapter gateway")]
struct Cli {
	/// Path to the gateway configuration file
	#[arg(long, default_value = "config/ledgers.json")]
	config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();
	setup_logging().map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

	let cli = Cli::parse();
	let config = GatewayConfig::load(&cli.config)?;
	let registry = bootstrap::initialize_registry(&config)?;

	for id in registry.ids() {
		let adapter = registry.get(&id)?;
		match adapter.test_connection().await {
			Ok(version) => info!("ledger {} reachable: {}", id, version),
			Err(e) => warn!("ledger {} is not reachable yet: {}", id, e),
		}
	}

	info!("ledger gateway ready");
	tokio::signal::ctrl_c().await?;
	info!("shutting down");
	Ok(())
}
