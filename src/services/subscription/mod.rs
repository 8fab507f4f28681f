//! Smart-contract event subscriptions.
//!
//! A subscription scopes the shared log stream down to one contract and
//! event signature (with one wildcard per declared output parameter),
//! decodes each matching log, applies the filter expression, and holds
//! every match back until its carrying transaction reaches the required
//! confirmation depth. Only then is an [`Occurrence`] emitted, stamped
//! with the confirming block's timestamp, so subscribers never observe an
//! event that could still be reorganized away below their confidence.
//!
//! Non-matching logs are discarded silently. A failing confirmation
//! watch, a bad filter, or a dying log stream terminates the whole
//! subscription with that error; there is no per-occurrence recovery.

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::{
	sync::{broadcast, broadcast::error::RecvError, mpsc},
	task::JoinSet,
};
use tracing::warn;

use crate::models::{AdapterError, LogEntry, LogFilter, Occurrence, Parameter, TransactionState};
use crate::services::{blockchain::LedgerClient, codec, filter, monitor::TransactionWatcher};

mod stream;

pub use stream::SubscriptionStream;

const STREAM_BUFFER: usize = 64;

/// Builds event subscriptions over one ledger client
pub struct EventSubscriber<C> {
	client: Arc<C>,
	watcher: TransactionWatcher<C>,
}

impl<C: LedgerClient> EventSubscriber<C> {
	pub fn new(client: Arc<C>, watcher: TransactionWatcher<C>) -> Self {
		Self { client, watcher }
	}

	/// Subscribes to an event of a deployed contract.
	///
	/// # Arguments
	/// * `contract` - Address of the emitting contract
	/// * `event_identifier` - Name of the event
	/// * `output_parameters` - Declared event parameters, in order
	/// * `wait_for_depth` - Confirmations the carrying transaction needs
	///   before an occurrence is emitted
	/// * `filter_expression` - Optional boolean filter over the decoded
	///   parameters
	///
	/// # Errors
	/// Unknown type tags and malformed filter expressions are rejected
	/// here, before the subscription ever observes a log
	pub fn subscribe(
		&self,
		contract: Address,
		event_identifier: &str,
		output_parameters: &[Parameter],
		wait_for_depth: u64,
		filter_expression: Option<String>,
	) -> Result<SubscriptionStream<Occurrence>, AdapterError> {
		let types = codec::resolve_types(output_parameters)?;
		filter::validate(filter_expression.as_deref(), output_parameters)?;

		let log_filter = LogFilter {
			address: contract,
			topics: std::iter::once(Some(codec::event_topic(event_identifier, &types)))
				.chain(output_parameters.iter().map(|_| None))
				.collect(),
		};

		let (out_tx, out_rx) = mpsc::channel(STREAM_BUFFER);
		let driver = tokio::spawn(run_subscription(
			self.client.clone(),
			self.watcher.clone(),
			self.client.subscribe_logs(),
			log_filter,
			output_parameters.to_vec(),
			filter_expression,
			wait_for_depth,
			out_tx,
		));
		Ok(SubscriptionStream::new(out_rx, driver))
	}
}

/// Driver loop of one subscription: scope, decode, filter, confirm, emit
#[allow(clippy::too_many_arguments)]
async fn run_subscription<C: LedgerClient>(
	client: Arc<C>,
	watcher: TransactionWatcher<C>,
	mut logs: broadcast::Receiver<LogEntry>,
	log_filter: LogFilter,
	declared: Vec<Parameter>,
	filter_expression: Option<String>,
	wait_for_depth: u64,
	out_tx: mpsc::Sender<Result<Occurrence, AdapterError>>,
) {
	let mut confirmations: JoinSet<Result<Occurrence, AdapterError>> = JoinSet::new();
	loop {
		tokio::select! {
			_ = out_tx.closed() => break,

			received = logs.recv() => match received {
				Ok(log) => {
					if !log_filter.matches(&log) {
						continue;
					}
					let parameters = match codec::decode_values(&declared, &log.data) {
						Ok(parameters) => parameters,
						Err(e) => {
							let _ = out_tx.send(Err(e)).await;
							break;
						}
					};
					match filter::evaluate(filter_expression.as_deref(), &parameters) {
						// held back until the carrying transaction confirms
						Ok(true) => {
							let client = client.clone();
							let watcher = watcher.clone();
							confirmations.spawn(confirm_occurrence(
								client,
								watcher,
								log,
								parameters,
								wait_for_depth,
							));
						}
						// non-match: no emission, no error
						Ok(false) => {}
						Err(e) => {
							let _ = out_tx.send(Err(e)).await;
							break;
						}
					}
				}
				Err(RecvError::Lagged(skipped)) => {
					warn!("event subscription lagged behind the log stream by {}", skipped);
				}
				Err(RecvError::Closed) => {
					let _ = out_tx
						.send(Err(AdapterError::node_unreachable(
							"log stream ended underneath the subscription",
						)))
						.await;
					break;
				}
			},

			Some(joined) = confirmations.join_next(), if !confirmations.is_empty() => {
				match joined {
					Ok(Ok(occurrence)) => {
						if out_tx.send(Ok(occurrence)).await.is_err() {
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

/// Waits out one matched log's confirmation and stamps the occurrence
async fn confirm_occurrence<C: LedgerClient>(
	client: Arc<C>,
	watcher: TransactionWatcher<C>,
	log: LogEntry,
	parameters: Vec<Parameter>,
	wait_for_depth: u64,
) -> Result<Occurrence, AdapterError> {
	let confirmed = watcher
		.watch(
			log.transaction_hash,
			wait_for_depth as i64,
			&[TransactionState::Confirmed],
		)
		.await?;

	// the confirming block is wherever the transaction sits now; a reorg
	// may have moved it since the log was observed
	let confirming_hash = confirmed.block.map(|b| b.hash).unwrap_or(log.block_hash);
	let block = client.block_by_hash(&confirming_hash).await?.ok_or_else(|| {
		AdapterError::invalid_transaction(format!(
			"confirming block {} is unknown to the ledger",
			confirming_hash
		))
	})?;

	Ok(Occurrence {
		parameters,
		iso_timestamp: format_iso_timestamp(block.timestamp)?,
	})
}

/// Renders a block timestamp as an ISO-8601 local date-time in UTC
fn format_iso_timestamp(seconds: u64) -> Result<String, AdapterError> {
	let timestamp = chrono::DateTime::from_timestamp(seconds as i64, 0).ok_or_else(|| {
		AdapterError::invalid_transaction(format!("block timestamp {} is out of range", seconds))
	})?;
	Ok(timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
}
