//! Transaction and event-occurrence result models.
//!
//! A [`Transaction`] is constructed once a watch resolves (or a read-only
//! call returns) and is immutable from then on. An [`Occurrence`] is one
//! confirmed, filter-matching firing of a subscribed smart-contract event.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::{ledger::TransactionInfo, Parameter};

/// Resolved state of a watched transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
	/// The transaction hash is unknown to the ledger
	NotFound,
	/// Seen but currently without a containing block (orphan risk)
	Pending,
	/// Reached the required confirmation depth
	Confirmed,
	/// Result of a read-only call; no ledger state was mutated
	ReturnValue,
}

impl std::fmt::Display for TransactionState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::NotFound => "NOT_FOUND",
			Self::Pending => "PENDING",
			Self::Confirmed => "CONFIRMED",
			Self::ReturnValue => "RETURN_VALUE",
		};
		write!(f, "{}", name)
	}
}

/// Reference to the block containing a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReference {
	pub number: u64,
	pub hash: B256,
}

/// A resolved transaction as reported back through the capability surface.
///
/// Identification fields are only populated when the ledger reported the
/// transaction's details; a `NOT_FOUND` resolution carries the state alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	pub hash: Option<B256>,
	pub from: Option<Address>,
	pub to: Option<Address>,
	pub value: Option<U256>,
	/// Containing block, absent until mined
	pub block: Option<BlockReference>,
	pub state: TransactionState,
	/// Ordered return values of a contract call, empty otherwise
	pub return_values: Vec<Parameter>,
}

impl Transaction {
	/// Builds the transaction reported for a resolved watch
	pub fn resolved(state: TransactionState, details: Option<&TransactionInfo>) -> Self {
		match details {
			Some(info) => Self {
				hash: Some(info.hash),
				from: Some(info.from),
				to: info.to,
				value: Some(info.value),
				block: info.block,
				state,
				return_values: Vec::new(),
			},
			None => Self {
				hash: None,
				from: None,
				to: None,
				value: None,
				block: None,
				state,
				return_values: Vec::new(),
			},
		}
	}

	/// Builds the transaction reported for a successful read-only call
	pub fn return_value(return_values: Vec<Parameter>) -> Self {
		Self {
			hash: None,
			from: None,
			to: None,
			value: None,
			block: None,
			state: TransactionState::ReturnValue,
			return_values,
		}
	}
}

/// One matched firing of a subscribed smart-contract event.
///
/// The timestamp is taken from the confirming block, so subscribers never
/// observe a time for an occurrence whose carrying transaction could still
/// be reorganized away below the required confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
	/// Ordered decoded event parameters
	pub parameters: Vec<Parameter>,
	/// ISO-8601 timestamp of the confirming block (UTC)
	pub iso_timestamp: String,
}
