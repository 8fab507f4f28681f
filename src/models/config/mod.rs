//! Gateway configuration loading and validation.
//!
//! The gateway is configured from a single JSON file listing the ledger
//! nodes it should connect to at startup. Wallet and keystore material is
//! deliberately not part of this file; only the sending account address
//! is named here and the node is expected to hold the key.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

mod error;

pub use error::ConfigError;

use alloy::primitives::Address;

const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_ADVERSARY_RATIO: f64 = 0.2;
const DEFAULT_MAX_CONFIRMATION_DEPTH: u64 = 12;

fn default_poll_interval_ms() -> u64 {
	DEFAULT_POLL_INTERVAL_MS
}

fn default_adversary_ratio() -> f64 {
	DEFAULT_ADVERSARY_RATIO
}

fn default_max_confirmation_depth() -> u64 {
	DEFAULT_MAX_CONFIRMATION_DEPTH
}

/// Supported ledger kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
	Ethereum,
}

/// One configured ledger connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
	/// Opaque identifier the registry is keyed by, e.g. `eth-0`
	pub id: String,
	pub kind: LedgerKind,
	/// JSON-RPC endpoint of the ledger node
	pub node_url: String,
	/// Account the adapter sends from; the node must hold its key
	pub account: String,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Assumed adversary share of the network's mining power
	#[serde(default = "default_adversary_ratio")]
	pub adversary_ratio: f64,
	/// Depth treated as practical finality for this ledger
	#[serde(default = "default_max_confirmation_depth")]
	pub max_confirmation_depth: u64,
}

/// Root of the gateway configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
	pub ledgers: Vec<LedgerEntry>,
}

impl GatewayConfig {
	/// Loads and validates a configuration file
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = fs::read_to_string(path)?;
		let config: GatewayConfig = serde_json::from_str(&contents)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration
	///
	/// # Errors
	/// Returns a validation error for duplicate ids, unparseable node
	/// URLs or accounts, or out-of-range tuning values
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut seen = std::collections::HashSet::new();
		for entry in &self.ledgers {
			if entry.id.trim().is_empty() {
				return Err(ConfigError::validation_error("ledger id must not be empty"));
			}
			if !seen.insert(entry.id.as_str()) {
				return Err(ConfigError::validation_error(format!(
					"duplicate ledger id: {}",
					entry.id
				)));
			}
			Url::parse(&entry.node_url).map_err(|e| {
				ConfigError::validation_error(format!(
					"invalid node url for {}: {}",
					entry.id, e
				))
			})?;
			entry.account.parse::<Address>().map_err(|e| {
				ConfigError::validation_error(format!(
					"invalid account for {}: {}",
					entry.id, e
				))
			})?;
			if entry.poll_interval_ms == 0 {
				return Err(ConfigError::validation_error(format!(
					"poll interval for {} must be positive",
					entry.id
				)));
			}
			if !(entry.adversary_ratio > 0.0 && entry.adversary_ratio < 0.5) {
				return Err(ConfigError::validation_error(format!(
					"adversary ratio for {} must be in (0, 0.5)",
					entry.id
				)));
			}
		}
		Ok(())
	}
}
