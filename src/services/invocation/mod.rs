//! Smart-contract invocation pipeline.
//!
//! An invocation resolves the contract path, encodes the call, and then
//! probes a read-only evaluation before ever spending on a transaction:
//! a function declared with outputs is first evaluated against current
//! state, and only when that is inapplicable (the function mutates state
//! after all) does the pipeline fall back to a nonce-serialized send
//! tracked through the transaction monitor. The probing order is fixed
//! policy; a read has neither side effects nor cost, a write has both.

use std::sync::Arc;

use alloy::primitives::Address;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::{AdapterError, CallRequest, Parameter, Transaction, TransactionState};
use crate::services::{blockchain::LedgerClient, codec, monitor::TransactionWatcher};

mod sender;

pub use sender::TransactionSender;

lazy_static! {
	static ref CONTRACT_ADDRESS: Regex =
		Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("contract address pattern is valid");
}

/// Resolves a smart-contract path to a ledger-native contract handle.
///
/// An Ethereum contract path is a single segment holding the contract's
/// address.
///
/// # Errors
/// Fails fast with a smart-contract-not-found error for paths with the
/// wrong number of segments or a malformed address
pub fn parse_contract_path(path: &str) -> Result<Address, AdapterError> {
	let segments: Vec<&str> = path.trim().split('/').collect();
	if segments.len() != 1 {
		return Err(AdapterError::smart_contract_not_found(format!(
			"expected a single path segment, got {}",
			segments.len()
		)));
	}
	if !CONTRACT_ADDRESS.is_match(segments[0]) {
		return Err(AdapterError::smart_contract_not_found(format!(
			"'{}' is not a contract address",
			segments[0]
		)));
	}
	segments[0]
		.parse::<Address>()
		.map_err(|e| AdapterError::smart_contract_not_found(e.to_string()))
}

/// Drives smart-contract invocations over one ledger client
pub struct InvocationPipeline<C> {
	client: Arc<C>,
	sender: Arc<TransactionSender<C>>,
	watcher: TransactionWatcher<C>,
}

impl<C: LedgerClient> InvocationPipeline<C> {
	pub fn new(
		client: Arc<C>,
		sender: Arc<TransactionSender<C>>,
		watcher: TransactionWatcher<C>,
	) -> Self {
		Self {
			client,
			sender,
			watcher,
		}
	}

	/// Invokes a smart-contract function.
	///
	/// # Arguments
	/// * `contract_path` - Path resolving to the deployed contract
	/// * `function_identifier` - Name of the function to invoke
	/// * `inputs` - Typed input parameters with values
	/// * `outputs` - Declared output parameters; non-empty outputs enable
	///   the read-only probe
	/// * `wait_for_depth` - Confirmations required if a transaction ends
	///   up being sent
	///
	/// # Errors
	/// Encoding problems surface as parameter errors before any network
	/// call; malformed paths as smart-contract-not-found errors.
	pub async fn invoke(
		&self,
		contract_path: &str,
		function_identifier: &str,
		inputs: &[Parameter],
		outputs: &[Parameter],
		wait_for_depth: u64,
	) -> Result<Transaction, AdapterError> {
		let contract = parse_contract_path(contract_path)?;

		// encode and validate everything before touching the network
		let data = codec::function_call_data(function_identifier, inputs)?;
		codec::resolve_types(outputs)?;

		if !outputs.is_empty() {
			match self.evaluate_read_only(contract, &data, outputs).await {
				Ok(result) => return Ok(result),
				Err(e) => {
					debug!(
						"read-only evaluation of {} failed, falling back to a transaction: {}",
						function_identifier, e
					);
				}
			}
		}

		let hash = self.sender.send_call(contract, data).await?;
		self.watcher
			.watch(
				hash,
				wait_for_depth as i64,
				&[TransactionState::Confirmed, TransactionState::NotFound],
			)
			.await
	}

	/// Evaluates the call against current state without mutating the ledger
	async fn evaluate_read_only(
		&self,
		contract: Address,
		data: &[u8],
		outputs: &[Parameter],
	) -> Result<Transaction, AdapterError> {
		let request = CallRequest {
			from: Some(self.sender.account()),
			to: Some(contract),
			data: Some(data.to_vec()),
			..Default::default()
		};
		let raw = self.client.call(&request).await?;
		let return_values = codec::decode_values(outputs, &raw)?;
		Ok(Transaction::return_value(return_values))
	}
}
