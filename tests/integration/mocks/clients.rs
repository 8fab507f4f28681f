//! Hand-rolled ledger client mock driving the broadcast streams.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicBool, AtomicU64, Ordering},
		Arc, Mutex,
	},
	time::Duration,
};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::broadcast;

use ledger_gateway::models::{
	AdapterError, BlockHeader, BlockReference, CallRequest, LogEntry, TransactionInfo,
};
use ledger_gateway::services::blockchain::LedgerClient;

const STREAM_CAPACITY: usize = 64;
const BASE_TIMESTAMP: u64 = 1_700_000_000;

/// Deterministic block hash for a block number
pub fn block_hash(number: u64) -> B256 {
	B256::from((U256::from(number) + U256::from(1)) << 200)
}

/// Deterministic transaction hash for tests
pub fn tx_hash(seed: u8) -> B256 {
	B256::from([seed; 32])
}

/// Scriptable in-memory ledger client.
///
/// Tests inject heads, transactions and logs into the broadcast streams
/// and mutate the lookup tables mid-test to emulate mining, reorgs and
/// node outages.
pub struct MockLedgerClient {
	heads: broadcast::Sender<BlockHeader>,
	transactions: broadcast::Sender<TransactionInfo>,
	logs: broadcast::Sender<LogEntry>,
	known_transactions: Mutex<HashMap<B256, TransactionInfo>>,
	known_blocks: Mutex<HashMap<B256, BlockHeader>>,
	call_response: Mutex<Option<Result<Vec<u8>, String>>>,
	sent_requests: Mutex<Vec<CallRequest>>,
	call_requests: Mutex<Vec<CallRequest>>,
	next_send_hash: Mutex<B256>,
	nonce: AtomicU64,
	fail_lookups: AtomicBool,
}

impl MockLedgerClient {
	pub fn new() -> Arc<Self> {
		let (heads, _) = broadcast::channel(STREAM_CAPACITY);
		let (transactions, _) = broadcast::channel(STREAM_CAPACITY);
		let (logs, _) = broadcast::channel(STREAM_CAPACITY);
		Arc::new(Self {
			heads,
			transactions,
			logs,
			known_transactions: Mutex::new(HashMap::new()),
			known_blocks: Mutex::new(HashMap::new()),
			call_response: Mutex::new(None),
			sent_requests: Mutex::new(Vec::new()),
			call_requests: Mutex::new(Vec::new()),
			next_send_hash: Mutex::new(tx_hash(0xaa)),
			nonce: AtomicU64::new(0),
			fail_lookups: AtomicBool::new(false),
		})
	}

	/// Announces a new head and registers its header for lookups
	pub fn push_head(&self, number: u64) -> BlockHeader {
		let header = BlockHeader {
			number,
			hash: block_hash(number),
			timestamp: BASE_TIMESTAMP + number,
		};
		self.known_blocks
			.lock()
			.unwrap()
			.insert(header.hash, header);
		let _ = self.heads.send(header);
		header
	}

	/// Broadcasts a transaction observed in a new block
	pub fn observe_transaction(&self, info: TransactionInfo) {
		let _ = self.transactions.send(info);
	}

	/// Broadcasts a raw event log
	pub fn push_log(&self, log: LogEntry) {
		let _ = self.logs.send(log);
	}

	/// Makes a transaction known to the ledger, blockless
	pub fn set_pending_transaction(&self, hash: B256, from: Address, to: Option<Address>) {
		self.known_transactions.lock().unwrap().insert(
			hash,
			TransactionInfo {
				hash,
				from,
				to,
				value: U256::ZERO,
				block: None,
			},
		);
	}

	/// Places a known transaction inside the given block
	pub fn mine_transaction(&self, hash: B256, from: Address, block_number: u64) {
		self.known_transactions.lock().unwrap().insert(
			hash,
			TransactionInfo {
				hash,
				from,
				to: Some(Address::from([0x77u8; 20])),
				value: U256::from(1),
				block: Some(BlockReference {
					number: block_number,
					hash: block_hash(block_number),
				}),
			},
		);
	}

	/// Drops a transaction from the ledger entirely
	pub fn forget_transaction(&self, hash: &B256) {
		self.known_transactions.lock().unwrap().remove(hash);
	}

	/// Configures the next read-only call to succeed with these bytes
	pub fn set_call_response(&self, data: Vec<u8>) {
		*self.call_response.lock().unwrap() = Some(Ok(data));
	}

	/// Configures read-only calls to fail
	pub fn set_call_failure(&self, message: impl Into<String>) {
		*self.call_response.lock().unwrap() = Some(Err(message.into()));
	}

	/// Hash the next send will report
	pub fn set_next_send_hash(&self, hash: B256) {
		*self.next_send_hash.lock().unwrap() = hash;
	}

	/// Makes every transaction lookup fail like a dead node
	pub fn set_fail_lookups(&self, fail: bool) {
		self.fail_lookups.store(fail, Ordering::SeqCst);
	}

	pub fn sent_requests(&self) -> Vec<CallRequest> {
		self.sent_requests.lock().unwrap().clone()
	}

	pub fn call_requests(&self) -> Vec<CallRequest> {
		self.call_requests.lock().unwrap().clone()
	}

	pub fn head_subscriber_count(&self) -> usize {
		self.heads.receiver_count()
	}

	pub fn log_subscriber_count(&self) -> usize {
		self.logs.receiver_count()
	}

	pub fn transaction_subscriber_count(&self) -> usize {
		self.transactions.receiver_count()
	}

	/// Waits until the head stream has at least `count` listeners
	pub async fn wait_for_head_subscribers(&self, count: usize) {
		while self.heads.receiver_count() < count {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	}

	/// Waits until the log stream has at least `count` listeners
	pub async fn wait_for_log_subscribers(&self, count: usize) {
		while self.logs.receiver_count() < count {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	}

	/// Waits until the transaction stream has at least `count` listeners
	pub async fn wait_for_transaction_subscribers(&self, count: usize) {
		while self.transactions.receiver_count() < count {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	}
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
	fn subscribe_heads(&self) -> broadcast::Receiver<BlockHeader> {
		self.heads.subscribe()
	}

	fn subscribe_transactions(&self) -> broadcast::Receiver<TransactionInfo> {
		self.transactions.subscribe()
	}

	fn subscribe_logs(&self) -> broadcast::Receiver<LogEntry> {
		self.logs.subscribe()
	}

	async fn transaction_by_hash(
		&self,
		hash: &B256,
	) -> Result<Option<TransactionInfo>, AdapterError> {
		if self.fail_lookups.load(Ordering::SeqCst) {
			return Err(AdapterError::node_unreachable("mock node is down"));
		}
		Ok(self.known_transactions.lock().unwrap().get(hash).cloned())
	}

	async fn block_by_hash(&self, hash: &B256) -> Result<Option<BlockHeader>, AdapterError> {
		if self.fail_lookups.load(Ordering::SeqCst) {
			return Err(AdapterError::node_unreachable("mock node is down"));
		}
		Ok(self.known_blocks.lock().unwrap().get(hash).copied())
	}

	async fn send_transaction(&self, request: &CallRequest) -> Result<B256, AdapterError> {
		self.sent_requests.lock().unwrap().push(request.clone());
		self.nonce.fetch_add(1, Ordering::SeqCst);
		Ok(*self.next_send_hash.lock().unwrap())
	}

	async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, AdapterError> {
		self.call_requests.lock().unwrap().push(request.clone());
		match self.call_response.lock().unwrap().as_ref() {
			Some(Ok(data)) => Ok(data.clone()),
			Some(Err(message)) => Err(AdapterError::invalid_transaction(message.clone())),
			None => Err(AdapterError::invalid_transaction(
				"mock has no call response configured",
			)),
		}
	}

	async fn transaction_count(&self, _account: Address) -> Result<u64, AdapterError> {
		Ok(self.nonce.load(Ordering::SeqCst))
	}

	async fn client_version(&self) -> Result<String, AdapterError> {
		Ok("MockLedger/0.1.0".to_string())
	}
}
