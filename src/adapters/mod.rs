//! Uniform ledger capability surface.
//!
//! Every ledger kind is exposed through the same fixed method set. A
//! ledger that has no native notion of an operation (a permissioned
//! ledger without value transfers, say) reports an
//! operation-not-supported error. That outcome is the default for every
//! method, so an adapter only implements what its ledger can actually
//! do.

use alloy::primitives::U256;
use async_trait::async_trait;

use crate::models::{AdapterError, Occurrence, Parameter, Transaction, TransactionState};
use crate::services::subscription::SubscriptionStream;

mod ethereum;

pub use ethereum::EthereumAdapter;

/// The capability interface implemented by every ledger adapter.
///
/// Identifiers, addresses and paths cross this boundary as opaque
/// strings; each adapter parses them into its ledger's native shape and
/// rejects what it cannot interpret.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
	/// Short name of the ledger kind, used in messages and logs
	fn kind(&self) -> &'static str;

	/// Submits a value transfer and tracks it to the required confidence
	async fn submit_transaction(
		&self,
		_receiver: &str,
		_value: U256,
		_required_confidence: f64,
	) -> Result<Transaction, AdapterError> {
		Err(AdapterError::operation_not_supported(format!(
			"{} does not support submitting value transfers",
			self.kind()
		)))
	}

	/// Streams incoming transfers to the adapter's account, each emitted
	/// once it reaches the required confidence
	fn receive_transactions(
		&self,
		_sender: Option<&str>,
		_required_confidence: f64,
	) -> Result<SubscriptionStream<Transaction>, AdapterError> {
		Err(AdapterError::operation_not_supported(format!(
			"{} does not support receiving value transfers",
			self.kind()
		)))
	}

	/// Tracks an already-submitted transaction to the required confidence
	async fn ensure_transaction_state(
		&self,
		_transaction_id: &str,
		_required_confidence: f64,
	) -> Result<TransactionState, AdapterError> {
		Err(AdapterError::operation_not_supported(format!(
			"{} does not support transaction state tracking",
			self.kind()
		)))
	}

	/// Reports whether a previously mined transaction lost its block
	async fn detect_orphaned_transaction(
		&self,
		_transaction_id: &str,
	) -> Result<TransactionState, AdapterError> {
		Err(AdapterError::operation_not_supported(format!(
			"{} does not support orphan detection",
			self.kind()
		)))
	}

	/// Invokes a smart-contract function, preferring a read-only
	/// evaluation over a state-changing transaction
	async fn invoke_smart_contract(
		&self,
		_smart_contract_path: &str,
		_function_identifier: &str,
		_inputs: &[Parameter],
		_outputs: &[Parameter],
		_required_confidence: f64,
	) -> Result<Transaction, AdapterError> {
		Err(AdapterError::operation_not_supported(format!(
			"{} does not support smart-contract invocation",
			self.kind()
		)))
	}

	/// Subscribes to a smart-contract event, emitting filter-matching
	/// occurrences once their carrying transaction is confirmed
	fn subscribe_to_event(
		&self,
		_smart_contract_address: &str,
		_event_identifier: &str,
		_output_parameters: &[Parameter],
		_required_confidence: f64,
		_filter: Option<&str>,
	) -> Result<SubscriptionStream<Occurrence>, AdapterError> {
		Err(AdapterError::operation_not_supported(format!(
			"{} does not support event subscriptions",
			self.kind()
		)))
	}

	/// Probes connectivity to the ledger node
	async fn test_connection(&self) -> Result<String, AdapterError>;
}
