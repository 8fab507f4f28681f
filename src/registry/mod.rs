//! Adapter registry: opaque ledger identifiers to adapter instances.
//!
//! Adapters are long-lived and shared; the registry is filled once at
//! bootstrap and read on every external request afterwards, so a plain
//! read-write lock over the map is all the coordination needed.

use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
};

use crate::adapters::LedgerAdapter;
use crate::models::AdapterError;

/// Concurrency-safe lookup table from ledger id to adapter instance
#[derive(Default)]
pub struct AdapterRegistry {
	adapters: RwLock<HashMap<String, Arc<dyn LedgerAdapter>>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an adapter under a ledger id, replacing any previous one
	pub fn register(&self, ledger_id: impl Into<String>, adapter: Arc<dyn LedgerAdapter>) {
		self.adapters
			.write()
			.expect("adapter registry lock poisoned")
			.insert(ledger_id.into(), adapter);
	}

	/// Resolves a ledger id to its shared adapter instance
	///
	/// # Errors
	/// Returns a ledger-id-not-found error for unregistered ids
	pub fn get(&self, ledger_id: &str) -> Result<Arc<dyn LedgerAdapter>, AdapterError> {
		self.adapters
			.read()
			.expect("adapter registry lock poisoned")
			.get(ledger_id)
			.cloned()
			.ok_or_else(|| {
				AdapterError::ledger_id_not_found(format!(
					"ledger-id <{}> does not exist",
					ledger_id
				))
			})
	}

	/// All currently registered ledger ids
	pub fn ids(&self) -> Vec<String> {
		self.adapters
			.read()
			.expect("adapter registry lock poisoned")
			.keys()
			.cloned()
			.collect()
	}
}
