//! Bootstrap module for building adapters from configuration.
//!
//! Turns each configured ledger entry into a connected wire client plus
//! an adapter instance, and registers them with the adapter registry the
//! external API resolves against.

use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use anyhow::Result;
use log::info;

use crate::{
	adapters::{EthereumAdapter, LedgerAdapter},
	models::{GatewayConfig, LedgerEntry, LedgerKind},
	registry::AdapterRegistry,
	services::{
		blockchain::EvmRpcClient,
		confidence::{ConfidenceCalculator, PowConfidenceCalculator},
	},
};

/// Builds and registers one adapter per configured ledger.
///
/// # Errors
/// Returns an error if an entry's account cannot be parsed into the
/// ledger's address shape
pub fn initialize_registry(config: &GatewayConfig) -> Result<AdapterRegistry> {
	let registry = AdapterRegistry::new();
	for entry in &config.ledgers {
		let adapter = build_adapter(entry)?;
		info!(
			"registered {} adapter for ledger id {}",
			adapter.kind(),
			entry.id
		);
		registry.register(entry.id.clone(), adapter);
	}
	Ok(registry)
}

fn build_adapter(entry: &LedgerEntry) -> Result<Arc<dyn LedgerAdapter>> {
	match entry.kind {
		LedgerKind::Ethereum => {
			let client = Arc::new(EvmRpcClient::connect(
				entry.node_url.as_str(),
				Duration::from_millis(entry.poll_interval_ms),
			));
			let account: Address = entry.account.parse()?;
			let confidence: Arc<dyn ConfidenceCalculator> = Arc::new(
				PowConfidenceCalculator::new(entry.adversary_ratio, entry.max_confirmation_depth),
			);
			Ok(Arc::new(EthereumAdapter::new(client, account, confidence)))
		}
	}
}
