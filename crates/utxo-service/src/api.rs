//! HTTP surface of the wallet service.
//!
//! Every operation is a `POST` to `/utxo.WalletUtxoService/<Method>` with the
//! request as a JSON body. Replies, including error-class replies, are sent
//! with status 200. A call that ends in a `Status` (an adaptor error or a
//! recovered panic) is answered with a non-200 status and the `Status` body.

use axum::{
	extract::State,
	http::{StatusCode, Uri},
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utxo_core::{CallInterceptor, ChainDispatcher};
use utxo_types::*;

macro_rules! service_path {
	($method:literal) => {
		concat!("/utxo.WalletUtxoService/", $method)
	};
}

/// Generates an axum handler that runs one dispatcher operation under the
/// interceptor. The full call path is taken from the request URI.
macro_rules! rpc_handler {
	($handler:ident, $request:ty) => {
		async fn $handler(
			State(state): State<AppState>,
			uri: Uri,
			Json(request): Json<$request>,
		) -> Response {
			let dispatcher = state.dispatcher.clone();
			state
				.interceptor
				.intercept(uri.path(), request, |req| async move {
					dispatcher.$handler(req).await
				})
				.await
				.map(Json)
				.map_err(ApiError)
				.into_response()
		}
	};
}

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
	dispatcher: Arc<ChainDispatcher>,
	interceptor: CallInterceptor,
}

/// A `Status` rendered as an HTTP error response.
#[derive(Debug)]
pub struct ApiError(pub Status);

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let http_status = match self.0.code {
			Code::InvalidArgument => StatusCode::BAD_REQUEST,
			Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
			Code::Internal | Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
		};
		(http_status, Json(self.0)).into_response()
	}
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	chains: Vec<String>,
	timestamp: i64,
}

/// Builds the service router around a dispatcher.
pub fn router(dispatcher: Arc<ChainDispatcher>) -> Router {
	let state = AppState {
		dispatcher,
		interceptor: CallInterceptor::new(),
	};

	Router::new()
		.route("/health", get(health_check))
		.route(service_path!("GetSupportChains"), post(get_support_chains))
		.route(service_path!("ConvertAddress"), post(convert_address))
		.route(service_path!("ValidAddress"), post(valid_address))
		.route(service_path!("GetFee"), post(get_fee))
		.route(service_path!("GetAccount"), post(get_account))
		.route(service_path!("GetUnspentOutputs"), post(get_unspent_outputs))
		.route(service_path!("GetBlockByNumber"), post(get_block_by_number))
		.route(service_path!("GetBlockByHash"), post(get_block_by_hash))
		.route(service_path!("GetBlockHeaderByHash"), post(get_block_header_by_hash))
		.route(
			service_path!("GetBlockHeaderByNumber"),
			post(get_block_header_by_number),
		)
		.route(service_path!("SendTx"), post(send_tx))
		.route(service_path!("GetTxByAddress"), post(get_tx_by_address))
		.route(service_path!("GetTxByHash"), post(get_tx_by_hash))
		.route(
			service_path!("CreateUnSignTransaction"),
			post(create_unsign_transaction),
		)
		.route(
			service_path!("BuildSignedTransaction"),
			post(build_signed_transaction),
		)
		.route(service_path!("DecodeTransaction"), post(decode_transaction))
		.route(
			service_path!("VerifySignedTransaction"),
			post(verify_signed_transaction),
		)
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Wallet service listener.
pub struct ApiServer {
	host: String,
	port: u16,
	dispatcher: Arc<ChainDispatcher>,
}

impl ApiServer {
	pub fn new(host: impl Into<String>, port: u16, dispatcher: Arc<ChainDispatcher>) -> Self {
		Self {
			host: host.into(),
			port,
			dispatcher,
		}
	}

	/// Serves until `shutdown` resolves, then lets in-flight calls finish.
	pub async fn run<S>(self, shutdown: S) -> anyhow::Result<()>
	where
		S: Future<Output = ()> + Send + 'static,
	{
		let app = router(self.dispatcher);
		let address = format!("{}:{}", self.host, self.port);
		let listener = tokio::net::TcpListener::bind(&address).await?;

		info!(address = %address, "Wallet rpc service listening");

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown)
			.await?;

		info!("Wallet rpc service stopped");
		Ok(())
	}
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		chains: state.dispatcher.registry().chains(),
		timestamp: chrono::Utc::now().timestamp(),
	})
}

rpc_handler!(get_support_chains, SupportChainsRequest);
rpc_handler!(convert_address, ConvertAddressRequest);
rpc_handler!(valid_address, ValidAddressRequest);
rpc_handler!(get_fee, FeeRequest);
rpc_handler!(get_account, AccountRequest);
rpc_handler!(get_unspent_outputs, UnspentOutputsRequest);
rpc_handler!(get_block_by_number, BlockNumberRequest);
rpc_handler!(get_block_by_hash, BlockHashRequest);
rpc_handler!(get_block_header_by_hash, BlockHeaderHashRequest);
rpc_handler!(get_block_header_by_number, BlockHeaderNumberRequest);
rpc_handler!(send_tx, SendTxRequest);
rpc_handler!(get_tx_by_address, TxAddressRequest);
rpc_handler!(get_tx_by_hash, TxHashRequest);
rpc_handler!(create_unsign_transaction, UnSignTransactionRequest);
rpc_handler!(build_signed_transaction, SignedTransactionRequest);
rpc_handler!(decode_transaction, DecodeTransactionRequest);
rpc_handler!(verify_signed_transaction, VerifyTransactionRequest);

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::{to_bytes, Body};
	use axum::http::{header, Method, Request};
	use serde_json::{json, Value};
	use tower::ServiceExt;
	use utxo_chains::testing::{SpyAdaptor, SpyMode};
	use utxo_chains::ChainRegistry;

	fn app_with(adaptors: Vec<SpyAdaptor>) -> Router {
		let mut registry = ChainRegistry::new();
		for adaptor in adaptors {
			registry.register(Arc::new(adaptor)).unwrap();
		}
		router(Arc::new(ChainDispatcher::new(Arc::new(registry))))
	}

	async fn post_json(app: Router, method: &str, body: Value) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(Method::POST)
			.uri(format!("/utxo.WalletUtxoService/{}", method))
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap();

		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
		(status, value)
	}

	#[tokio::test]
	async fn test_get_fee_success() {
		let app = app_with(vec![SpyAdaptor::new("bitcoin")]);
		let (status, body) = post_json(app, "GetFee", json!({"chain": "bitcoin"})).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["code"], "SUCCESS");
		assert_eq!(body["msg"], "get_fee");
		assert_eq!(body["best_fee"], "0.00012");
		assert_eq!(body["fast_fee"], "12");
	}

	#[tokio::test]
	async fn test_unregistered_chain_is_an_ok_reply() {
		let app = app_with(vec![SpyAdaptor::new("bitcoin")]);
		let (status, body) = post_json(
			app,
			"ConvertAddress",
			json!({"chain": "bitcoincash", "public_key": "02aa"}),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["code"], "ERROR");
		assert_eq!(body["msg"], "convert address fail at pre handle");
	}

	#[tokio::test]
	async fn test_support_chains_rejection_shape() {
		let app = app_with(vec![]);
		let (status, body) =
			post_json(app, "GetSupportChains", json!({"chain": "bitcoin"})).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(
			body,
			json!({"code": "ERROR", "msg": "Unsupported operation", "support": false})
		);
	}

	#[tokio::test]
	async fn test_panic_becomes_internal_error() {
		let app = app_with(vec![SpyAdaptor::with_mode("bitcoin", SpyMode::Panic)]);
		let (status, body) = post_json(app, "SendTx", json!({"chain": "bitcoin"})).await;

		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body["code"], "INTERNAL");
		assert_eq!(body["message"], "Panic err: send_tx exploded");
	}

	#[tokio::test]
	async fn test_adaptor_error_maps_to_unavailable() {
		let app = app_with(vec![SpyAdaptor::with_mode("bitcoin", SpyMode::Fail)]);
		let (status, body) = post_json(
			app,
			"GetTxByHash",
			json!({"chain": "bitcoin", "hash": "abcd"}),
		)
		.await;

		assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
		assert_eq!(body["code"], "UNAVAILABLE");
	}

	#[tokio::test]
	async fn test_every_method_is_routed() {
		let methods = [
			"GetSupportChains",
			"ConvertAddress",
			"ValidAddress",
			"GetFee",
			"GetAccount",
			"GetUnspentOutputs",
			"GetBlockByNumber",
			"GetBlockByHash",
			"GetBlockHeaderByHash",
			"GetBlockHeaderByNumber",
			"SendTx",
			"GetTxByAddress",
			"GetTxByHash",
			"CreateUnSignTransaction",
			"BuildSignedTransaction",
			"DecodeTransaction",
			"VerifySignedTransaction",
		];

		for method in methods {
			let app = app_with(vec![SpyAdaptor::new("bitcoin")]);
			let (status, body) = post_json(app, method, json!({"chain": "bitcoin"})).await;
			assert_eq!(status, StatusCode::OK, "{} was not routed", method);
			assert_eq!(body["code"], "SUCCESS", "{} failed", method);
		}
	}

	#[tokio::test]
	async fn test_unknown_method_not_found() {
		let app = app_with(vec![SpyAdaptor::new("bitcoin")]);
		let (status, _) = post_json(app, "GetBalance", json!({"chain": "bitcoin"})).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_health_lists_chains() {
		let app = app_with(vec![
			SpyAdaptor::new("bitcoincash"),
			SpyAdaptor::new("bitcoin"),
		]);
		let request = Request::builder()
			.uri("/health")
			.body(Body::empty())
			.unwrap();

		let response = app.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body: Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(body["status"], "ok");
		assert_eq!(body["chains"], json!(["bitcoin", "bitcoincash"]));
		assert!(body["timestamp"].as_i64().unwrap() > 0);
	}
}
