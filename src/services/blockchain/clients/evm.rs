//! EVM-compatible ledger client implementation.
//!
//! Maps the [`LedgerClient`] boundary onto the standard `eth_*` JSON-RPC
//! surface and runs a background poller that turns block polling into the
//! broadcast push streams the engines consume. The node is expected to
//! hold the sending account's key; outgoing calls go through
//! `eth_sendTransaction`.

use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{json, Value};
use tokio::{sync::broadcast, task::JoinHandle};

use crate::models::{
	AdapterError, BlockHeader, BlockReference, CallRequest, LogEntry, TransactionInfo,
};
use crate::services::blockchain::{client::LedgerClient, transports::HttpTransport};

const STREAM_CAPACITY: usize = 256;

/// Client for EVM-compatible ledgers, backed by a JSON-RPC node
pub struct EvmRpcClient {
	transport: HttpTransport,
	heads_tx: broadcast::Sender<BlockHeader>,
	transactions_tx: broadcast::Sender<TransactionInfo>,
	logs_tx: broadcast::Sender<LogEntry>,
	poller: JoinHandle<()>,
}

impl EvmRpcClient {
	/// Creates a client and starts its background head poller
	///
	/// # Arguments
	/// * `node_url` - JSON-RPC endpoint of the ledger node
	/// * `poll_interval` - How often to look for new heads
	pub fn connect(node_url: impl Into<String>, poll_interval: Duration) -> Self {
		let transport = HttpTransport::new(node_url);
		let (heads_tx, _) = broadcast::channel(STREAM_CAPACITY);
		let (transactions_tx, _) = broadcast::channel(STREAM_CAPACITY);
		let (logs_tx, _) = broadcast::channel(STREAM_CAPACITY);

		let poller = tokio::spawn(poll_loop(
			transport.clone(),
			heads_tx.clone(),
			transactions_tx.clone(),
			logs_tx.clone(),
			poll_interval,
		));

		Self {
			transport,
			heads_tx,
			transactions_tx,
			logs_tx,
			poller,
		}
	}
}

impl Drop for EvmRpcClient {
	fn drop(&mut self) {
		self.poller.abort();
	}
}

#[async_trait]
impl LedgerClient for EvmRpcClient {
	fn subscribe_heads(&self) -> broadcast::Receiver<BlockHeader> {
		self.heads_tx.subscribe()
	}

	fn subscribe_transactions(&self) -> broadcast::Receiver<TransactionInfo> {
		self.transactions_tx.subscribe()
	}

	fn subscribe_logs(&self) -> broadcast::Receiver<LogEntry> {
		self.logs_tx.subscribe()
	}

	async fn transaction_by_hash(
		&self,
		hash: &B256,
	) -> Result<Option<TransactionInfo>, AdapterError> {
		let result = self
			.transport
			.send_raw_request("eth_getTransactionByHash", Some(json!([format!("{}", hash)])))
			.await?;
		if result.is_null() {
			return Ok(None);
		}
		parse_transaction(&result).map(Some)
	}

	async fn block_by_hash(&self, hash: &B256) -> Result<Option<BlockHeader>, AdapterError> {
		let result = self
			.transport
			.send_raw_request(
				"eth_getBlockByHash",
				Some(json!([format!("{}", hash), false])),
			)
			.await?;
		if result.is_null() {
			return Ok(None);
		}
		parse_header(&result).map(Some)
	}

	async fn send_transaction(&self, request: &CallRequest) -> Result<B256, AdapterError> {
		let result = self
			.transport
			.send_raw_request("eth_sendTransaction", Some(json!([call_object(request)])))
			.await?;
		parse_b256(&result)
	}

	async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, AdapterError> {
		let result = self
			.transport
			.send_raw_request("eth_call", Some(json!([call_object(request), "latest"])))
			.await?;
		parse_hex_bytes(&result)
	}

	async fn transaction_count(&self, account: Address) -> Result<u64, AdapterError> {
		let result = self
			.transport
			.send_raw_request(
				"eth_getTransactionCount",
				Some(json!([format!("{}", account), "latest"])),
			)
			.await?;
		parse_quantity(&result)
	}

	async fn client_version(&self) -> Result<String, AdapterError> {
		let result = self
			.transport
			.send_raw_request("web3_clientVersion", None)
			.await?;
		result
			.as_str()
			.map(str::to_string)
			.ok_or_else(|| AdapterError::invalid_transaction("client version is not a string"))
	}
}

/// Background loop feeding the broadcast streams from block polling.
///
/// Transport failures only delay notifications; watches keep waiting and
/// decide their own fate when their queries fail.
async fn poll_loop(
	transport: HttpTransport,
	heads_tx: broadcast::Sender<BlockHeader>,
	transactions_tx: broadcast::Sender<TransactionInfo>,
	logs_tx: broadcast::Sender<LogEntry>,
	poll_interval: Duration,
) {
	let mut ticker = tokio::time::interval(poll_interval);
	let mut last_seen: Option<u64> = None;
	loop {
		ticker.tick().await;
		if let Err(e) =
			poll_once(&transport, &heads_tx, &transactions_tx, &logs_tx, &mut last_seen).await
		{
			warn!("head poll against {} failed: {}", transport.url(), e);
		}
	}
}

async fn poll_once(
	transport: &HttpTransport,
	heads_tx: &broadcast::Sender<BlockHeader>,
	transactions_tx: &broadcast::Sender<TransactionInfo>,
	logs_tx: &broadcast::Sender<LogEntry>,
	last_seen: &mut Option<u64>,
) -> Result<(), AdapterError> {
	let latest = parse_quantity(&transport.send_raw_request("eth_blockNumber", None).await?)?;

	let start = match *last_seen {
		// first observation: report the current head only
		None => latest,
		Some(last) if latest > last => last + 1,
		Some(last) if latest < last => {
			// the node switched to a shorter chain; realign silently
			debug!("head went backwards from {} to {}", last, latest);
			*last_seen = Some(latest);
			return Ok(());
		}
		Some(_) => return Ok(()),
	};

	// fetch the whole range before broadcasting anything, so a failure
	// mid-poll leaves the cursor untouched and nothing is replayed
	let mut headers = Vec::new();
	let mut observed = Vec::new();
	for number in start..=latest {
		let block = transport
			.send_raw_request(
				"eth_getBlockByNumber",
				Some(json!([format!("0x{:x}", number), true])),
			)
			.await?;
		if block.is_null() {
			continue;
		}
		headers.push(parse_header(&block)?);

		if let Some(transactions) = block.get("transactions").and_then(Value::as_array) {
			for entry in transactions {
				observed.push(parse_transaction(entry)?);
			}
		}
	}

	let logs = transport
		.send_raw_request(
			"eth_getLogs",
			Some(json!([{
				"fromBlock": format!("0x{:x}", start),
				"toBlock": format!("0x{:x}", latest),
			}])),
		)
		.await?;
	let mut matched_logs = Vec::new();
	if let Some(entries) = logs.as_array() {
		for entry in entries {
			matched_logs.push(parse_log(entry)?);
		}
	}

	for transaction in observed {
		let _ = transactions_tx.send(transaction);
	}
	for log in matched_logs {
		let _ = logs_tx.send(log);
	}
	// heads go out last: a watch triggered by a new head must be able to
	// observe the transactions and logs that head carried
	for header in headers {
		let _ = heads_tx.send(header);
	}

	*last_seen = Some(latest);
	Ok(())
}

fn call_object(request: &CallRequest) -> Value {
	let mut object = serde_json::Map::new();
	if let Some(from) = request.from {
		object.insert("from".to_string(), json!(format!("{}", from)));
	}
	if let Some(to) = request.to {
		object.insert("to".to_string(), json!(format!("{}", to)));
	}
	if let Some(value) = request.value {
		object.insert("value".to_string(), json!(format!("0x{:x}", value)));
	}
	if let Some(data) = &request.data {
		object.insert("data".to_string(), json!(format!("0x{}", hex::encode(data))));
	}
	if let Some(nonce) = request.nonce {
		object.insert("nonce".to_string(), json!(format!("0x{:x}", nonce)));
	}
	Value::Object(object)
}

fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value, AdapterError> {
	value.get(name).ok_or_else(|| {
		AdapterError::invalid_transaction(format!("ledger response is missing '{}'", name))
	})
}

fn parse_quantity(value: &Value) -> Result<u64, AdapterError> {
	let text = value.as_str().ok_or_else(|| {
		AdapterError::invalid_transaction(format!("expected hex quantity, got {}", value))
	})?;
	u64::from_str_radix(text.trim_start_matches("0x"), 16)
		.map_err(|e| AdapterError::invalid_transaction(format!("bad quantity '{}': {}", text, e)))
}

fn parse_u256(value: &Value) -> Result<U256, AdapterError> {
	let text = value.as_str().ok_or_else(|| {
		AdapterError::invalid_transaction(format!("expected hex quantity, got {}", value))
	})?;
	U256::from_str_radix(text.trim_start_matches("0x"), 16)
		.map_err(|e| AdapterError::invalid_transaction(format!("bad quantity '{}': {}", text, e)))
}

fn parse_b256(value: &Value) -> Result<B256, AdapterError> {
	let text = value.as_str().ok_or_else(|| {
		AdapterError::invalid_transaction(format!("expected hash, got {}", value))
	})?;
	text.parse::<B256>()
		.map_err(|e| AdapterError::invalid_transaction(format!("bad hash '{}': {}", text, e)))
}

fn parse_address(value: &Value) -> Result<Address, AdapterError> {
	let text = value.as_str().ok_or_else(|| {
		AdapterError::invalid_transaction(format!("expected address, got {}", value))
	})?;
	text.parse::<Address>()
		.map_err(|e| AdapterError::invalid_transaction(format!("bad address '{}': {}", text, e)))
}

fn parse_hex_bytes(value: &Value) -> Result<Vec<u8>, AdapterError> {
	let text = value.as_str().ok_or_else(|| {
		AdapterError::invalid_transaction(format!("expected hex data, got {}", value))
	})?;
	hex::decode(text.trim_start_matches("0x"))
		.map_err(|e| AdapterError::invalid_transaction(format!("bad hex data '{}': {}", text, e)))
}

fn parse_header(block: &Value) -> Result<BlockHeader, AdapterError> {
	Ok(BlockHeader {
		number: parse_quantity(field(block, "number")?)?,
		hash: parse_b256(field(block, "hash")?)?,
		timestamp: parse_quantity(field(block, "timestamp")?)?,
	})
}

fn parse_transaction(entry: &Value) -> Result<TransactionInfo, AdapterError> {
	let block = match (entry.get("blockNumber"), entry.get("blockHash")) {
		(Some(number), Some(hash)) if !number.is_null() && !hash.is_null() => {
			Some(BlockReference {
				number: parse_quantity(number)?,
				hash: parse_b256(hash)?,
			})
		}
		_ => None,
	};
	let to = match entry.get("to") {
		Some(value) if !value.is_null() => Some(parse_address(value)?),
		_ => None,
	};
	Ok(TransactionInfo {
		hash: parse_b256(field(entry, "hash")?)?,
		from: parse_address(field(entry, "from")?)?,
		to,
		value: parse_u256(field(entry, "value")?)?,
		block,
	})
}

fn parse_log(entry: &Value) -> Result<LogEntry, AdapterError> {
	let topics = field(entry, "topics")?
		.as_array()
		.ok_or_else(|| AdapterError::invalid_transaction("log topics are not an array"))?
		.iter()
		.map(parse_b256)
		.collect::<Result<Vec<_>, _>>()?;
	Ok(LogEntry {
		address: parse_address(field(entry, "address")?)?,
		topics,
		data: parse_hex_bytes(field(entry, "data")?)?,
		block_hash: parse_b256(field(entry, "blockHash")?)?,
		block_number: parse_quantity(field(entry, "blockNumber")?)?,
		transaction_hash: parse_b256(field(entry, "transactionHash")?)?,
	})
}
