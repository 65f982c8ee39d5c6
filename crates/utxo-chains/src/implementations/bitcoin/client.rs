//! JSON-RPC client for bitcoin-family full nodes.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};
use utxo_types::{AdaptorError, AdaptorResult, NodeConfig};

const REQUEST_ID: &str = "utxo-gateway";

/// Thin JSON-RPC 1.0 client over HTTP POST with basic auth.
///
/// `reqwest::Client` pools connections internally and is safe to share, so a
/// single `RpcClient` serves all concurrent calls for its chain.
#[derive(Debug, Clone)]
pub struct RpcClient {
	http: reqwest::Client,
	url: String,
	user: String,
	pass: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
	result: Option<T>,
	error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
	code: i64,
	message: String,
}

impl<T> RpcEnvelope<T> {
	fn into_result(self, method: &str) -> AdaptorResult<T> {
		if let Some(err) = self.error {
			return Err(AdaptorError::Rpc(format!(
				"{} failed ({}): {}",
				method, err.code, err.message
			)));
		}
		self.result
			.ok_or_else(|| AdaptorError::Rpc(format!("{} returned no result", method)))
	}
}

impl RpcClient {
	pub fn new(node: &NodeConfig) -> AdaptorResult<Self> {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(node.timeout_secs))
			.build()
			.map_err(|e| {
				error!(error = %e, "new node rpc client fail");
				AdaptorError::Config(format!("Failed to build RPC client: {}", e))
			})?;

		Ok(Self {
			http,
			url: normalize_url(&node.rpc_url),
			user: node.rpc_user.clone(),
			pass: node.rpc_pass.clone(),
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Calls `method` with positional `params` and decodes the `result` field.
	pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> AdaptorResult<T> {
		debug!(method, %params, "node rpc call");

		let body = json!({
			"jsonrpc": "1.0",
			"id": REQUEST_ID,
			"method": method,
			"params": params,
		});

		let mut request = self.http.post(&self.url).json(&body);
		if !self.user.is_empty() {
			request = request.basic_auth(&self.user, Some(&self.pass));
		}

		let response = request.send().await.map_err(|e| {
			error!(method, error = %e, "node rpc request fail");
			AdaptorError::Rpc(format!("{} request failed: {}", method, e))
		})?;

		// Nodes answer RPC-level errors with a non-2xx status and a JSON body,
		// so the body is decoded regardless of the HTTP status.
		let status = response.status();
		let envelope: RpcEnvelope<T> = response.json().await.map_err(|e| {
			error!(method, %status, error = %e, "node rpc response unreadable");
			AdaptorError::Rpc(format!(
				"{} returned HTTP {} with an unreadable body: {}",
				method, status, e
			))
		})?;

		envelope.into_result(method)
	}
}

/// Prefixes `http://` when the configured host carries no scheme.
fn normalize_url(rpc_url: &str) -> String {
	let trimmed = rpc_url.trim();
	if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
		trimmed.to_string()
	} else {
		format!("http://{}", trimmed)
	}
}
