//! JSON-RPC 2.0 transport over HTTP.

use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

use serde_json::{json, Value};

use crate::models::AdapterError;

/// Plain HTTP JSON-RPC transport shared by all requests of one client
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	url: String,
	request_id: Arc<AtomicU64>,
}

impl HttpTransport {
	/// Creates a transport for the given node URL
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
			request_id: Arc::new(AtomicU64::new(1)),
		}
	}

	/// The node URL this transport talks to
	pub fn url(&self) -> &str {
		&self.url
	}

	/// Sends a raw JSON-RPC request and returns the `result` field
	///
	/// # Arguments
	/// * `method` - The RPC method name
	/// * `params` - Optional parameters, defaults to an empty array
	///
	/// # Errors
	/// * `NodeUnreachable` for transport-level failures
	/// * `InvalidTransaction` when the node answers with an RPC error or
	///   an envelope without a result
	pub async fn send_raw_request(
		&self,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, AdapterError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": self.request_id.fetch_add(1, Ordering::SeqCst),
			"method": method,
			"params": params.unwrap_or_else(|| json!([])),
		});

		let response = self
			.client
			.post(&self.url)
			.json(&body)
			.send()
			.await?
			.error_for_status()?;

		let envelope: Value = response.json().await?;

		if let Some(error) = envelope.get("error") {
			if !error.is_null() {
				return Err(AdapterError::invalid_transaction(format!(
					"node rejected {}: {}",
					method, error
				)));
			}
		}

		envelope.get("result").cloned().ok_or_else(|| {
			AdapterError::invalid_transaction(format!(
				"response to {} is missing the 'result' field",
				method
			))
		})
	}
}
