//! Integration tests for the smart-contract invocation pipeline.

use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use alloy_dyn_abi::DynSolValue;
use tokio::time::timeout;

use ledger_gateway::models::{AdapterError, Parameter, TransactionState};
use ledger_gateway::services::{
	codec,
	invocation::{InvocationPipeline, TransactionSender},
	monitor::TransactionWatcher,
};

use crate::integration::mocks::{tx_hash, MockLedgerClient};

const RESOLVE: Duration = Duration::from_secs(2);
const CONTRACT_PATH: &str = "0x1000000000000000000000000000000000000001";

fn account() -> Address {
	Address::from([0x22u8; 20])
}

fn pipeline(client: &Arc<MockLedgerClient>) -> InvocationPipeline<MockLedgerClient> {
	let sender = Arc::new(TransactionSender::new(client.clone(), account()));
	InvocationPipeline::new(client.clone(), sender, TransactionWatcher::new(client.clone()))
}

#[tokio::test]
async fn test_read_only_evaluation_short_circuits() {
	let client = MockLedgerClient::new();
	let pipeline = pipeline(&client);

	// the node answers the probe with a single uint256
	let answer = DynSolValue::Tuple(vec![codec::encode_value(&Parameter::new(
		"total",
		"uint256",
		"42",
	))
	.unwrap()])
	.abi_encode_params();
	client.set_call_response(answer);

	let outputs = vec![Parameter::declared("total", "uint256")];
	let transaction = pipeline
		.invoke(CONTRACT_PATH, "totalSupply", &[], &outputs, 2)
		.await
		.unwrap();

	assert_eq!(transaction.state, TransactionState::ReturnValue);
	assert_eq!(
		transaction.return_values,
		vec![Parameter::new("total", "uint256", "42")]
	);
	// the probe never became a transaction
	assert_eq!(client.call_requests().len(), 1);
	assert!(client.sent_requests().is_empty());
}

#[tokio::test]
async fn test_empty_outputs_go_straight_to_send() {
	let client = MockLedgerClient::new();
	let pipeline = pipeline(&client);
	let hash = tx_hash(0x31);
	client.set_next_send_hash(hash);
	// even a configured call response must not be consulted
	client.set_call_response(Vec::new());

	let inputs = vec![Parameter::new(
		"to",
		"address",
		"0x00a329c0648769a73afac7f9381e08fb43dbea72",
	)];
	let mut handle = tokio::spawn(async move {
		pipeline.invoke(CONTRACT_PATH, "register", &inputs, &[], 1).await
	});

	client.wait_for_head_subscribers(1).await;
	client.mine_transaction(hash, account(), 5);
	client.push_head(6);

	let transaction = timeout(RESOLVE, &mut handle)
		.await
		.expect("invocation should confirm")
		.unwrap()
		.unwrap();
	assert_eq!(transaction.state, TransactionState::Confirmed);
	assert!(client.call_requests().is_empty());

	let sent = client.sent_requests();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].from, Some(account()));
	assert_eq!(sent[0].nonce, Some(0));
	// selector plus one encoded address argument
	assert_eq!(sent[0].data.as_ref().unwrap().len(), 4 + 32);
}

#[tokio::test]
async fn test_failed_probe_falls_back_to_transaction() {
	let client = MockLedgerClient::new();
	let pipeline = pipeline(&client);
	let hash = tx_hash(0x32);
	client.set_next_send_hash(hash);
	client.set_call_failure("execution reverted");

	let outputs = vec![Parameter::declared("ok", "bool")];
	let mut handle = tokio::spawn(async move {
		pipeline.invoke(CONTRACT_PATH, "activate", &[], &outputs, 0).await
	});

	client.wait_for_head_subscribers(1).await;
	client.mine_transaction(hash, account(), 9);
	client.push_head(9);

	let transaction = timeout(RESOLVE, &mut handle)
		.await
		.expect("fallback transaction should confirm")
		.unwrap()
		.unwrap();
	assert_eq!(transaction.state, TransactionState::Confirmed);
	// probed first, then sent
	assert_eq!(client.call_requests().len(), 1);
	assert_eq!(client.sent_requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_path_fails_fast() {
	let client = MockLedgerClient::new();
	let pipeline = pipeline(&client);

	let result = pipeline
		.invoke("channel/chaincode", "query", &[], &[], 0)
		.await;
	assert!(matches!(
		result,
		Err(AdapterError::SmartContractNotFound(_))
	));
	assert!(client.call_requests().is_empty());
	assert!(client.sent_requests().is_empty());
}

#[tokio::test]
async fn test_bad_input_value_never_reaches_the_ledger() {
	let client = MockLedgerClient::new();
	let pipeline = pipeline(&client);

	let inputs = vec![Parameter::new("amount", "uint256", "twelve")];
	let result = pipeline
		.invoke(CONTRACT_PATH, "deposit", &inputs, &[], 0)
		.await;
	assert!(matches!(result, Err(AdapterError::ParameterError(_))));
	assert!(client.call_requests().is_empty());
	assert!(client.sent_requests().is_empty());
}

#[tokio::test]
async fn test_unknown_output_type_never_reaches_the_ledger() {
	let client = MockLedgerClient::new();
	let pipeline = pipeline(&client);

	let outputs = vec![Parameter::declared("total", "decimal")];
	let result = pipeline
		.invoke(CONTRACT_PATH, "totalSupply", &[], &outputs, 0)
		.await;
	assert!(matches!(result, Err(AdapterError::ParameterError(_))));
	assert!(client.call_requests().is_empty());
	assert!(client.sent_requests().is_empty());
}
