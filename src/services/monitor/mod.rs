//! Transaction state monitoring over the live head stream.
//!
//! A watch tracks one transaction hash until it resolves into a terminal
//! state. On every new head it re-evaluates three observations, in order:
//! the hash may be unknown (`NOT_FOUND`), the transaction may currently
//! have no containing block (`PENDING`, orphan risk), or its containing
//! block may have gathered enough confirmations (`CONFIRMED`). The watch
//! resolves the first time a candidate state is in its interested set;
//! everything else keeps it observing.
//!
//! A watch is a plain future: resolution, failure and cancellation all
//! end the future, which releases its head-stream subscription exactly
//! once. A dropped watch can never fire again. Within one watch, heads
//! are evaluated strictly in arrival order; a lagged receiver skips ahead
//! rather than replaying history.

use std::sync::Arc;

use alloy::primitives::B256;
use log::{debug, info, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::models::{AdapterError, Transaction, TransactionState};
use crate::services::blockchain::LedgerClient;

/// Depth used by watches that must never consider the transaction durably
/// committed, i.e. pure orphan detection
pub const NEVER_CONFIRM_DEPTH: i64 = -1;

/// Watches transactions against the head stream of one ledger client
pub struct TransactionWatcher<C> {
	client: Arc<C>,
}

impl<C> Clone for TransactionWatcher<C> {
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
		}
	}
}

impl<C: LedgerClient> TransactionWatcher<C> {
	pub fn new(client: Arc<C>) -> Self {
		Self { client }
	}

	/// Tracks a transaction until it reaches one of the interested states.
	///
	/// # Arguments
	/// * `tx_hash` - Hash of the transaction to monitor
	/// * `wait_for_depth` - Confirmations required before `CONFIRMED` is
	///   reported; [`NEVER_CONFIRM_DEPTH`] keeps the watch from ever
	///   confirming
	/// * `interested` - The states whose detection resolves this watch
	///
	/// # Errors
	/// A transport failure while querying the ledger fails the watch with
	/// a node-unreachable error; the watch is terminal and is not retried
	/// internally.
	pub async fn watch(
		&self,
		tx_hash: B256,
		wait_for_depth: i64,
		interested: &[TransactionState],
	) -> Result<Transaction, AdapterError> {
		let mut heads = self.client.subscribe_heads();
		loop {
			let head = match heads.recv().await {
				Ok(head) => head,
				Err(RecvError::Lagged(skipped)) => {
					warn!(
						"watch on {} lagged behind the head stream by {} heads",
						tx_hash, skipped
					);
					continue;
				}
				Err(RecvError::Closed) => {
					return Err(AdapterError::node_unreachable(format!(
						"head stream ended while watching {}",
						tx_hash
					)));
				}
			};

			let lookup = self.client.transaction_by_hash(&tx_hash).await?;

			let candidate = match &lookup {
				// unknown hash: invalidated, or never existed
				None => {
					debug!("transaction {} is not known to the ledger", tx_hash);
					Some(TransactionState::NotFound)
				}
				Some(details) => match &details.block {
					// previously seen, currently blockless
					None => {
						debug!("transaction {} has no containing block", tx_hash);
						Some(TransactionState::Pending)
					}
					Some(block) => {
						if wait_for_depth >= 0
							&& head.number.saturating_sub(block.number) >= wait_for_depth as u64
						{
							Some(TransactionState::Confirmed)
						} else {
							None
						}
					}
				},
			};

			if let Some(state) = candidate {
				if interested.contains(&state) {
					info!("watch on {} resolved to {}", tx_hash, state);
					return Ok(Transaction::resolved(state, lookup.as_ref()));
				}
			}
		}
	}
}
