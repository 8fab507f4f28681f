//! Ethereum ledger adapter.
//!
//! Implements the full capability surface by wiring the transaction
//! monitor, the invocation pipeline and the event subscription engine
//! over one shared [`LedgerClient`]. All watches of one adapter instance
//! fan out over the client's broadcast streams; the only serialized
//! section is nonce acquisition inside the shared sender.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use log::info;
use tokio::{
	sync::{broadcast, broadcast::error::RecvError, mpsc},
	task::JoinSet,
};

use crate::models::{
	AdapterError, Occurrence, Parameter, Transaction, TransactionInfo, TransactionState,
};
use crate::services::{
	blockchain::LedgerClient,
	confidence::ConfidenceCalculator,
	invocation::{InvocationPipeline, TransactionSender},
	monitor::{TransactionWatcher, NEVER_CONFIRM_DEPTH},
	subscription::{EventSubscriber, SubscriptionStream},
};

use super::LedgerAdapter;

const RECEIVE_BUFFER: usize = 64;

/// Adapter for Ethereum-style ledgers with linear-chain confirmation
pub struct EthereumAdapter<C: LedgerClient> {
	client: Arc<C>,
	watcher: TransactionWatcher<C>,
	sender: Arc<TransactionSender<C>>,
	pipeline: InvocationPipeline<C>,
	events: EventSubscriber<C>,
	confidence: Arc<dyn ConfidenceCalculator>,
}

impl<C: LedgerClient> EthereumAdapter<C> {
	/// Wires an adapter over a connected client.
	///
	/// # Arguments
	/// * `client` - Shared wire client for the ledger node
	/// * `account` - Account the adapter sends from
	/// * `confidence` - Confidence calculator for this ledger's finality
	///   characteristics
	pub fn new(
		client: Arc<C>,
		account: Address,
		confidence: Arc<dyn ConfidenceCalculator>,
	) -> Self {
		let watcher = TransactionWatcher::new(client.clone());
		let sender = Arc::new(TransactionSender::new(client.clone(), account));
		let pipeline = InvocationPipeline::new(client.clone(), sender.clone(), watcher.clone());
		let events = EventSubscriber::new(client.clone(), watcher.clone());
		Self {
			client,
			watcher,
			sender,
			pipeline,
			events,
			confidence,
		}
	}

	fn parse_transaction_id(&self, transaction_id: &str) -> Result<B256, AdapterError> {
		transaction_id.trim().parse::<B256>().map_err(|e| {
			AdapterError::invalid_transaction(format!(
				"'{}' is not a transaction hash: {}",
				transaction_id, e
			))
		})
	}
}

#[async_trait]
impl<C: LedgerClient> LedgerAdapter for EthereumAdapter<C> {
	fn kind(&self) -> &'static str {
		"ethereum"
	}

	async fn submit_transaction(
		&self,
		receiver: &str,
		value: U256,
		required_confidence: f64,
	) -> Result<Transaction, AdapterError> {
		let receiver = receiver.trim().parse::<Address>().map_err(|e| {
			AdapterError::invalid_transaction(format!(
				"'{}' is not a receiver address: {}",
				receiver, e
			))
		})?;
		let wait_for_depth = self.confidence.depth_for(required_confidence)?;

		let hash = self.sender.send_value(receiver, value).await?;
		self.watcher
			.watch(
				hash,
				wait_for_depth as i64,
				&[TransactionState::Confirmed, TransactionState::NotFound],
			)
			.await
	}

	fn receive_transactions(
		&self,
		sender: Option<&str>,
		required_confidence: f64,
	) -> Result<SubscriptionStream<Transaction>, AdapterError> {
		let sender_filter = match sender.map(str::trim) {
			None => None,
			Some("") => None,
			Some(address) => Some(address.parse::<Address>().map_err(|e| {
				AdapterError::invalid_transaction(format!(
					"'{}' is not a sender address: {}",
					address, e
				))
			})?),
		};
		let wait_for_depth = self.confidence.depth_for(required_confidence)?;

		let (out_tx, out_rx) = mpsc::channel(RECEIVE_BUFFER);
		let driver = tokio::spawn(run_incoming_transfers(
			self.watcher.clone(),
			self.client.subscribe_transactions(),
			self.sender.account(),
			sender_filter,
			wait_for_depth,
			out_tx,
		));
		Ok(SubscriptionStream::new(out_rx, driver))
	}

	async fn ensure_transaction_state(
		&self,
		transaction_id: &str,
		required_confidence: f64,
	) -> Result<TransactionState, AdapterError> {
		let hash = self.parse_transaction_id(transaction_id)?;
		let wait_for_depth = self.confidence.depth_for(required_confidence)?;
		let transaction = self
			.watcher
			.watch(
				hash,
				wait_for_depth as i64,
				&[TransactionState::Confirmed, TransactionState::NotFound],
			)
			.await?;
		Ok(transaction.state)
	}

	async fn detect_orphaned_transaction(
		&self,
		transaction_id: &str,
	) -> Result<TransactionState, AdapterError> {
		let hash = self.parse_transaction_id(transaction_id)?;
		let transaction = self
			.watcher
			.watch(
				hash,
				NEVER_CONFIRM_DEPTH,
				&[TransactionState::Pending, TransactionState::NotFound],
			)
			.await?;
		Ok(transaction.state)
	}

	async fn invoke_smart_contract(
		&self,
		smart_contract_path: &str,
		function_identifier: &str,
		inputs: &[Parameter],
		outputs: &[Parameter],
		required_confidence: f64,
	) -> Result<Transaction, AdapterError> {
		let wait_for_depth = self.confidence.depth_for(required_confidence)?;
		self.pipeline
			.invoke(
				smart_contract_path,
				function_identifier,
				inputs,
				outputs,
				wait_for_depth,
			)
			.await
	}

	fn subscribe_to_event(
		&self,
		smart_contract_address: &str,
		event_identifier: &str,
		output_parameters: &[Parameter],
		required_confidence: f64,
		filter: Option<&str>,
	) -> Result<SubscriptionStream<Occurrence>, AdapterError> {
		let contract = smart_contract_address.trim().parse::<Address>().map_err(|e| {
			AdapterError::smart_contract_not_found(format!(
				"'{}' is not a contract address: {}",
				smart_contract_address, e
			))
		})?;
		let wait_for_depth = self.confidence.depth_for(required_confidence)?;
		self.events.subscribe(
			contract,
			event_identifier,
			output_parameters,
			wait_for_depth,
			filter.map(str::to_string),
		)
	}

	async fn test_connection(&self) -> Result<String, AdapterError> {
		let version = self.client.client_version().await?;
		info!("connected to ethereum client: {}", version);
		Ok(version)
	}
}

/// Driver loop behind `receive_transactions`: pick out transfers to our
/// account, confirm each one, emit it
async fn run_incoming_transfers<C: LedgerClient>(
	watcher: TransactionWatcher<C>,
	mut transactions: broadcast::Receiver<TransactionInfo>,
	recipient: Address,
	sender_filter: Option<Address>,
	wait_for_depth: u64,
	out_tx: mpsc::Sender<Result<Transaction, AdapterError>>,
) {
	let mut confirmations: JoinSet<Result<Transaction, AdapterError>> = JoinSet::new();
	loop {
		tokio::select! {
			_ = out_tx.closed() => break,

			received = transactions.recv() => match received {
				Ok(observed) => {
					if observed.to != Some(recipient) {
						continue;
					}
					if let Some(expected) = sender_filter {
						if observed.from != expected {
							continue;
						}
					}
					info!("new incoming transfer observed from {}", observed.from);
					let watcher = watcher.clone();
					confirmations.spawn(async move {
						watcher
							.watch(
								observed.hash,
								wait_for_depth as i64,
								&[TransactionState::Confirmed],
							)
							.await
					});
				}
				Err(RecvError::Lagged(skipped)) => {
					log::warn!("transfer subscription lagged by {} transactions", skipped);
				}
				Err(RecvError::Closed) => {
					let _ = out_tx
						.send(Err(AdapterError::node_unreachable(
							"transaction stream ended underneath the subscription",
						)))
						.await;
					break;
				}
			},

			Some(joined) = confirmations.join_next(), if !confirmations.is_empty() => {
				match joined {
					Ok(Ok(transaction)) => {
						if out_tx.send(Ok(transaction)).await.is_err() {
							break;
						}
					}
					Ok(Err(e)) => {
						let _ = out_tx.send(Err(e)).await;
						break;
					}
					Err(_) => break,
				}
			}
		}
	}
}
