//! Nonce-serialized transaction sending.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use tokio::sync::Mutex;

use crate::models::{AdapterError, CallRequest};
use crate::services::blockchain::LedgerClient;

/// Sends state-changing calls and value transfers from one account.
///
/// Nonce acquisition and submission run under a single async mutex: two
/// concurrent sends through the same adapter must never read the same
/// nonce. This is the only mutual exclusion in the engine; everything
/// else fans out over independent stream subscriptions.
pub struct TransactionSender<C> {
	client: Arc<C>,
	account: Address,
	nonce_lock: Mutex<()>,
}

impl<C: LedgerClient> TransactionSender<C> {
	pub fn new(client: Arc<C>, account: Address) -> Self {
		Self {
			client,
			account,
			nonce_lock: Mutex::new(()),
		}
	}

	/// The account this sender spends from
	pub fn account(&self) -> Address {
		self.account
	}

	/// Sends a plain value transfer and returns its transaction hash
	pub async fn send_value(&self, to: Address, value: U256) -> Result<B256, AdapterError> {
		self.send(CallRequest {
			to: Some(to),
			value: Some(value),
			..Default::default()
		})
		.await
	}

	/// Sends an encoded contract call and returns its transaction hash
	pub async fn send_call(&self, to: Address, data: Vec<u8>) -> Result<B256, AdapterError> {
		self.send(CallRequest {
			to: Some(to),
			data: Some(data),
			..Default::default()
		})
		.await
	}

	async fn send(&self, mut request: CallRequest) -> Result<B256, AdapterError> {
		let _guard = self.nonce_lock.lock().await;
		let nonce = self.client.transaction_count(self.account).await?;
		request.from = Some(self.account);
		request.nonce = Some(nonce);
		self.client.send_transaction(&request).await
	}
}
