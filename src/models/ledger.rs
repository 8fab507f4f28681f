//! Boundary types exchanged with the ledger wire client.
//!
//! These model the collaborator contracts the engine relies on: new-head
//! notifications, on-demand transaction/block lookups, raw event logs and
//! the native log filter, and outgoing call requests. An absent
//! transaction and a blockless transaction are deliberately two distinct
//! observations (`Option<TransactionInfo>` vs. `TransactionInfo.block`);
//! each watch's interested-state set decides which one it reacts to.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::transaction::BlockReference;

/// One "new block" notification from the ledger's head stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
	pub number: u64,
	pub hash: B256,
	/// Seconds since the Unix epoch, as reported by the ledger
	pub timestamp: u64,
}

/// A transaction as currently known to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
	pub hash: B256,
	pub from: Address,
	/// Absent for contract creations
	pub to: Option<Address>,
	pub value: U256,
	/// Containing block; absent while the transaction is blockless
	pub block: Option<BlockReference>,
}

/// A raw smart-contract event log observed on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
	/// Emitting contract address
	pub address: Address,
	/// Topic list; the first entry is the event signature topic
	pub topics: Vec<B256>,
	/// ABI-encoded non-indexed event data
	pub data: Vec<u8>,
	pub block_hash: B256,
	pub block_number: u64,
	/// Hash of the transaction that emitted the log
	pub transaction_hash: B256,
}

/// Ledger-native log filter: contract address plus a topic pattern with
/// one wildcard (`None`) per declared event parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
	pub address: Address,
	pub topics: Vec<Option<B256>>,
}

impl LogFilter {
	/// Whether a raw log satisfies this filter
	pub fn matches(&self, log: &LogEntry) -> bool {
		if log.address != self.address {
			return false;
		}
		self.topics.iter().enumerate().all(|(i, topic)| match topic {
			Some(expected) => log.topics.get(i) == Some(expected),
			None => true,
		})
	}
}

/// An outgoing call or value transfer, before ledger-specific signing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
	pub from: Option<Address>,
	pub to: Option<Address>,
	pub value: Option<U256>,
	/// Encoded function-call data for contract invocations
	pub data: Option<Vec<u8>>,
	pub nonce: Option<u64>,
}
