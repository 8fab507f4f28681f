//! Core ledger client interface.
//!
//! This trait is the boundary the confirmation and subscription engines
//! are written against: a push stream of new heads, transactions and
//! logs, on-demand lookups, and the outgoing send/call operations. Any
//! wire client that can satisfy it plugs into every adapter service.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::models::{AdapterError, BlockHeader, CallRequest, LogEntry, TransactionInfo};

/// Uniform access to one ledger node.
///
/// The broadcast subscriptions fan out: every receiver observes every
/// notification independently, so each watch can attach and detach its
/// own subscription without coordinating with the others.
#[async_trait]
pub trait LedgerClient: Send + Sync + 'static {
	/// Attaches a new listener to the "new head" stream
	fn subscribe_heads(&self) -> broadcast::Receiver<BlockHeader>;

	/// Attaches a new listener to the stream of transactions observed in
	/// new blocks
	fn subscribe_transactions(&self) -> broadcast::Receiver<TransactionInfo>;

	/// Attaches a new listener to the stream of raw event logs
	fn subscribe_logs(&self) -> broadcast::Receiver<LogEntry>;

	/// Looks up a transaction by hash
	///
	/// # Returns
	/// `Ok(None)` if the ledger does not know the hash; absence is an
	/// observation, not an error
	async fn transaction_by_hash(
		&self,
		hash: &B256,
	) -> Result<Option<TransactionInfo>, AdapterError>;

	/// Looks up a block header by block hash
	async fn block_by_hash(&self, hash: &B256) -> Result<Option<BlockHeader>, AdapterError>;

	/// Submits a signed-by-the-node call or value transfer
	///
	/// # Returns
	/// The resulting transaction hash
	async fn send_transaction(&self, request: &CallRequest) -> Result<B256, AdapterError>;

	/// Evaluates a call against current state without mutating the ledger
	async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, AdapterError>;

	/// Number of transactions sent from an account, used as the next nonce
	async fn transaction_count(&self, account: Address) -> Result<u64, AdapterError>;

	/// Reports the node's client version string
	async fn client_version(&self) -> Result<String, AdapterError>;
}
