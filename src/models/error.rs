//! Adapter error types and handling.
//!
//! Every failure the capability surface can report maps to one of the
//! error kinds defined here. The REST layer above this crate translates
//! each kind to its own status code; the only obligation at this level
//! is to surface the right kind with a readable message.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors reported by ledger adapters
#[derive(Debug)]
pub enum AdapterError {
	/// Transport or connectivity failure while talking to the ledger node
	NodeUnreachable(String),

	/// Malformed or rejected transaction, or an unexpected ledger response
	InvalidTransaction(String),

	/// Input encoding/decoding mismatch: wrong arity, unsupported type,
	/// malformed value
	ParameterError(String),

	/// A smart-contract path does not resolve to a deployed contract
	SmartContractNotFound(String),

	/// The capability is intentionally absent for this ledger kind
	OperationNotSupported(String),

	/// Registry lookup miss for an unknown ledger identifier
	LedgerIdNotFound(String),
}

impl AdapterError {
	/// Formats the error message based on the error kind
	fn format_message(&self) -> String {
		match self {
			Self::NodeUnreachable(msg) => format!("Ledger node unreachable: {}", msg),
			Self::InvalidTransaction(msg) => format!("Invalid transaction: {}", msg),
			Self::ParameterError(msg) => format!("Parameter error: {}", msg),
			Self::SmartContractNotFound(msg) => format!("Smart contract not found: {}", msg),
			Self::OperationNotSupported(msg) => format!("Operation not supported: {}", msg),
			Self::LedgerIdNotFound(msg) => format!("Ledger id not found: {}", msg),
		}
	}

	/// Creates a new node unreachable error with logging
	pub fn node_unreachable(msg: impl Into<String>) -> Self {
		let error = Self::NodeUnreachable(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new invalid transaction error with logging
	pub fn invalid_transaction(msg: impl Into<String>) -> Self {
		let error = Self::InvalidTransaction(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new parameter error with logging
	pub fn parameter_error(msg: impl Into<String>) -> Self {
		let error = Self::ParameterError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new smart contract not found error with logging
	pub fn smart_contract_not_found(msg: impl Into<String>) -> Self {
		let error = Self::SmartContractNotFound(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new operation not supported error with logging
	pub fn operation_not_supported(msg: impl Into<String>) -> Self {
		let error = Self::OperationNotSupported(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new ledger id not found error with logging
	pub fn ledger_id_not_found(msg: impl Into<String>) -> Self {
		let error = Self::LedgerIdNotFound(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for AdapterError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for AdapterError {}

/// Conversion from reqwest errors: anything the HTTP layer reports is a
/// connectivity problem from the adapter's point of view
impl From<reqwest::Error> for AdapterError {
	fn from(err: reqwest::Error) -> Self {
		Self::node_unreachable(err.to_string())
	}
}
