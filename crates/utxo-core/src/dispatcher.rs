//! Chain dispatcher implementing the full wallet operation surface.
//!
//! Each operation runs the pre-handle gate first. A request for a chain that
//! is not registered is answered with an error-class reply of the operation's
//! own type, and no adaptor is touched. Otherwise the request is forwarded to
//! the adaptor bound to the chain and its result is returned unchanged.

use std::sync::Arc;
use tracing::debug;
use utxo_chains::ChainRegistry;
use utxo_types::*;

/// Generates a dispatch method that gates the request and then delegates to
/// the identically named adaptor method.
macro_rules! dispatch {
	($(#[$meta:meta])* $method:ident($request:ty) -> $response:ty, $rejection:expr) => {
		$(#[$meta])*
		pub async fn $method(&self, request: $request) -> AdaptorResult<$response> {
			match self.pre_handle(&request) {
				Ok(adaptor) => adaptor.$method(request).await,
				Err(_) => Ok(<$response>::failure($rejection)),
			}
		}
	};
}

/// Routes each request to the adaptor registered for its chain.
///
/// The dispatcher only reads the registry, so one instance can be shared
/// across all in-flight calls without locking.
#[derive(Debug, Clone)]
pub struct ChainDispatcher {
	registry: Arc<ChainRegistry>,
}

impl ChainDispatcher {
	pub fn new(registry: Arc<ChainRegistry>) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &Arc<ChainRegistry> {
		&self.registry
	}

	/// Checks that the request's chain is registered.
	///
	/// Returns the bound adaptor, or the shared "unsupported operation" reply
	/// when the chain is unknown.
	pub fn pre_handle<R>(&self, request: &R) -> Result<Arc<dyn ChainAdaptor>, SupportChainsResponse>
	where
		R: HasChain + ?Sized,
	{
		let chain = request.chain();
		match self.registry.get(chain) {
			Some(adaptor) => Ok(adaptor),
			None => {
				debug!(chain = %chain, "Chain not registered, rejecting request");
				Err(SupportChainsResponse {
					code: ReturnCode::Error,
					msg: UNSUPPORTED_OPERATION.to_string(),
					support: false,
				})
			}
		}
	}

	/// Reports whether the requested chain is served.
	///
	/// A rejected request gets the shared unsupported-operation reply; the
	/// adaptor answers otherwise.
	pub async fn get_support_chains(
		&self,
		request: SupportChainsRequest,
	) -> AdaptorResult<SupportChainsResponse> {
		match self.pre_handle(&request) {
			Ok(adaptor) => adaptor.get_support_chains(request).await,
			Err(rejection) => Ok(rejection),
		}
	}

	dispatch!(
		/// Derives an address from a public key.
		convert_address(ConvertAddressRequest) -> ConvertAddressResponse,
		"convert address fail at pre handle"
	);

	dispatch!(
		valid_address(ValidAddressRequest) -> ValidAddressResponse,
		"valid address fail at pre handle"
	);

	dispatch!(
		get_fee(FeeRequest) -> FeeResponse,
		"get fee fail at pre handle"
	);

	dispatch!(
		get_account(AccountRequest) -> AccountResponse,
		"get account fail at pre handle"
	);

	dispatch!(
		get_unspent_outputs(UnspentOutputsRequest) -> UnspentOutputsResponse,
		"get unspent outputs fail at pre handle"
	);

	dispatch!(
		get_block_by_number(BlockNumberRequest) -> BlockResponse,
		"get block by number fail at pre handle"
	);

	dispatch!(
		get_block_by_hash(BlockHashRequest) -> BlockResponse,
		"get block by hash fail at pre handle"
	);

	dispatch!(
		get_block_header_by_hash(BlockHeaderHashRequest) -> BlockHeaderResponse,
		"get block header by hash fail at pre handle"
	);

	dispatch!(
		get_block_header_by_number(BlockHeaderNumberRequest) -> BlockHeaderResponse,
		"get block header by number fail at pre handle"
	);

	dispatch!(
		/// Broadcasts a raw transaction.
		send_tx(SendTxRequest) -> SendTxResponse,
		"send tx fail at pre handle"
	);

	dispatch!(
		get_tx_by_address(TxAddressRequest) -> TxAddressResponse,
		"get tx by address fail at pre handle"
	);

	dispatch!(
		get_tx_by_hash(TxHashRequest) -> TxHashResponse,
		"get tx by hash fail at pre handle"
	);

	dispatch!(
		/// Builds an unsigned transaction and the hashes its inputs must sign.
		create_unsign_transaction(UnSignTransactionRequest) -> UnSignTransactionResponse,
		"create unsign transaction fail at pre handle"
	);

	dispatch!(
		/// Assembles a signed transaction from unsigned data and signatures.
		build_signed_transaction(SignedTransactionRequest) -> SignedTransactionResponse,
		"build signed transaction fail at pre handle"
	);

	dispatch!(
		decode_transaction(DecodeTransactionRequest) -> DecodeTransactionResponse,
		"decode transaction fail at pre handle"
	);

	dispatch!(
		verify_signed_transaction(VerifyTransactionRequest) -> VerifyTransactionResponse,
		"verify signed transaction fail at pre handle"
	);
}

#[cfg(test)]
mod tests {
	use super::*;
	use utxo_chains::testing::{SpyAdaptor, SpyMode};

	const ALL_OPERATIONS: [&str; 17] = [
		"get_support_chains",
		"convert_address",
		"valid_address",
		"get_fee",
		"get_account",
		"get_unspent_outputs",
		"get_block_by_number",
		"get_block_by_hash",
		"get_block_header_by_hash",
		"get_block_header_by_number",
		"send_tx",
		"get_tx_by_address",
		"get_tx_by_hash",
		"create_unsign_transaction",
		"build_signed_transaction",
		"decode_transaction",
		"verify_signed_transaction",
	];

	fn dispatcher_with(spies: &[Arc<SpyAdaptor>]) -> ChainDispatcher {
		let mut registry = ChainRegistry::new();
		for spy in spies {
			registry.register(spy.clone()).unwrap();
		}
		ChainDispatcher::new(Arc::new(registry))
	}

	/// Calls every operation for `chain` and collects each reply's code and message.
	async fn call_every_operation(
		dispatcher: &ChainDispatcher,
		chain: &str,
	) -> Vec<(ReturnCode, String)> {
		let chain = chain.to_string();
		let mut replies = Vec::new();

		macro_rules! call {
			($method:ident, $request:ident) => {{
				let response = dispatcher
					.$method($request {
						chain: chain.clone(),
						..Default::default()
					})
					.await
					.unwrap();
				replies.push((response.code(), response.msg().to_string()));
			}};
		}

		call!(get_support_chains, SupportChainsRequest);
		call!(convert_address, ConvertAddressRequest);
		call!(valid_address, ValidAddressRequest);
		call!(get_fee, FeeRequest);
		call!(get_account, AccountRequest);
		call!(get_unspent_outputs, UnspentOutputsRequest);
		call!(get_block_by_number, BlockNumberRequest);
		call!(get_block_by_hash, BlockHashRequest);
		call!(get_block_header_by_hash, BlockHeaderHashRequest);
		call!(get_block_header_by_number, BlockHeaderNumberRequest);
		call!(send_tx, SendTxRequest);
		call!(get_tx_by_address, TxAddressRequest);
		call!(get_tx_by_hash, TxHashRequest);
		call!(create_unsign_transaction, UnSignTransactionRequest);
		call!(build_signed_transaction, SignedTransactionRequest);
		call!(decode_transaction, DecodeTransactionRequest);
		call!(verify_signed_transaction, VerifyTransactionRequest);

		replies
	}

	#[test]
	fn test_pre_handle_rejection() {
		let dispatcher = dispatcher_with(&[Arc::new(SpyAdaptor::new("bitcoin"))]);

		let rejection = dispatcher
			.pre_handle(&FeeRequest {
				chain: "dogecoin".to_string(),
				..Default::default()
			})
			.err()
			.unwrap();
		assert_eq!(rejection.code, ReturnCode::Error);
		assert_eq!(rejection.msg, "Unsupported operation");
		assert!(!rejection.support);

		let adaptor = dispatcher
			.pre_handle(&FeeRequest {
				chain: "bitcoin".to_string(),
				..Default::default()
			})
			.ok()
			.unwrap();
		assert_eq!(adaptor.chain_name(), "bitcoin");
	}

	#[tokio::test]
	async fn test_unregistered_chain_never_reaches_adaptor() {
		let spy = Arc::new(SpyAdaptor::new("bitcoin"));
		let dispatcher = dispatcher_with(&[spy.clone()]);

		for chain in ["bitcoincash", "", "BITCOIN"] {
			let replies = call_every_operation(&dispatcher, chain).await;
			assert_eq!(replies.len(), ALL_OPERATIONS.len());
			for (code, msg) in &replies {
				assert_eq!(*code, ReturnCode::Error);
				assert!(
					msg == "Unsupported operation" || msg.ends_with("fail at pre handle"),
					"unexpected rejection message: {}",
					msg
				);
			}
		}

		assert_eq!(spy.call_count(), 0);
	}

	#[tokio::test]
	async fn test_registered_chain_reaches_matching_method() {
		let spy = Arc::new(SpyAdaptor::new("bitcoin"));
		let dispatcher = dispatcher_with(&[spy.clone()]);

		let replies = call_every_operation(&dispatcher, "bitcoin").await;
		for ((code, msg), operation) in replies.iter().zip(ALL_OPERATIONS) {
			assert_eq!(*code, ReturnCode::Success);
			assert_eq!(msg, operation);
		}
		assert_eq!(spy.calls(), ALL_OPERATIONS.to_vec());
	}

	#[tokio::test]
	async fn test_routes_by_chain() {
		let bitcoin = Arc::new(SpyAdaptor::new("bitcoin"));
		let bitcoin_cash = Arc::new(SpyAdaptor::new("bitcoincash"));
		let dispatcher = dispatcher_with(&[bitcoin.clone(), bitcoin_cash.clone()]);

		dispatcher
			.send_tx(SendTxRequest {
				chain: "bitcoincash".to_string(),
				..Default::default()
			})
			.await
			.unwrap();

		assert_eq!(bitcoin.call_count(), 0);
		assert_eq!(bitcoin_cash.calls(), vec!["send_tx"]);
	}

	#[tokio::test]
	async fn test_convert_address_for_unconfigured_chain() {
		let bitcoin = Arc::new(SpyAdaptor::new("bitcoin"));
		let dispatcher = dispatcher_with(&[bitcoin.clone()]);

		let response = dispatcher
			.convert_address(ConvertAddressRequest {
				chain: "bitcoincash".to_string(),
				public_key: vec![0x02; 33],
				..Default::default()
			})
			.await
			.unwrap();

		assert_eq!(response.code, ReturnCode::Error);
		assert!(response.msg.contains("pre handle"));
		assert!(response.address.is_empty());
		assert!(bitcoin.calls().is_empty());
	}

	#[tokio::test]
	async fn test_get_fee_passes_result_through() {
		let dispatcher = dispatcher_with(&[Arc::new(SpyAdaptor::new("bitcoin"))]);
		let request = FeeRequest {
			chain: "bitcoin".to_string(),
			coin: "BTC".to_string(),
			..Default::default()
		};

		let direct = SpyAdaptor::new("bitcoin")
			.get_fee(request.clone())
			.await
			.unwrap();
		let dispatched = dispatcher.get_fee(request).await.unwrap();

		assert_eq!(dispatched, direct);
		assert_eq!(dispatched.code, ReturnCode::Success);
		assert_eq!(dispatched.best_fee_sat, "12");
	}

	#[tokio::test]
	async fn test_adaptor_error_passes_through() {
		let spy = Arc::new(SpyAdaptor::with_mode("bitcoin", SpyMode::Fail));
		let dispatcher = dispatcher_with(&[spy.clone()]);

		let result = dispatcher
			.get_tx_by_hash(TxHashRequest {
				chain: "bitcoin".to_string(),
				hash: "abcd".to_string(),
				..Default::default()
			})
			.await;

		assert!(matches!(result, Err(AdaptorError::Rpc(ref msg)) if msg == "get_tx_by_hash failed"));
		assert_eq!(spy.call_count(), 1);
	}

	#[tokio::test]
	async fn test_empty_registry_rejects_everything() {
		let dispatcher = ChainDispatcher::new(Arc::new(ChainRegistry::new()));
		let response = dispatcher
			.get_support_chains(SupportChainsRequest {
				chain: "bitcoin".to_string(),
				..Default::default()
			})
			.await
			.unwrap();

		assert_eq!(response.code, ReturnCode::Error);
		assert_eq!(response.msg, UNSUPPORTED_OPERATION);
		assert!(!response.support);
	}
}
