//! Integration tests for the JSON-RPC HTTP transport and EVM client.

use serde_json::json;

use ledger_gateway::models::AdapterError;
use ledger_gateway::services::blockchain::HttpTransport;

#[tokio::test]
async fn test_send_raw_request_returns_result_field() {
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#)
		.create_async()
		.await;

	let transport = HttpTransport::new(server.url());
	let result = transport
		.send_raw_request("eth_blockNumber", None)
		.await
		.unwrap();
	assert_eq!(result, json!("0x10"));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_rpc_error_is_an_invalid_transaction() {
	let mut server = mockito::Server::new_async().await;
	server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#)
		.create_async()
		.await;

	let transport = HttpTransport::new(server.url());
	let result = transport
		.send_raw_request("eth_sendTransaction", Some(json!([{}])))
		.await;
	match result {
		Err(AdapterError::InvalidTransaction(message)) => {
			assert!(message.contains("nonce too low"));
		}
		other => panic!("expected an invalid transaction error, got {:?}", other),
	}
}

#[tokio::test]
async fn test_http_failure_is_node_unreachable() {
	let mut server = mockito::Server::new_async().await;
	server
		.mock("POST", "/")
		.with_status(502)
		.create_async()
		.await;

	let transport = HttpTransport::new(server.url());
	let result = transport.send_raw_request("eth_blockNumber", None).await;
	assert!(matches!(result, Err(AdapterError::NodeUnreachable(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_node_unreachable() {
	// nothing listens on this port
	let transport = HttpTransport::new("http://127.0.0.1:1");
	let result = transport.send_raw_request("eth_blockNumber", None).await;
	assert!(matches!(result, Err(AdapterError::NodeUnreachable(_))));
}

#[tokio::test]
async fn test_missing_result_field_is_rejected() {
	let mut server = mockito::Server::new_async().await;
	server
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1}"#)
		.create_async()
		.await;

	let transport = HttpTransport::new(server.url());
	let result = transport.send_raw_request("eth_blockNumber", None).await;
	assert!(matches!(result, Err(AdapterError::InvalidTransaction(_))));
}
