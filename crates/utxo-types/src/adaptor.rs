//! The contract every per-chain backend satisfies.

use crate::configs::GatewayConfig;
use crate::errors::AdaptorResult;
use crate::utxo::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Backend implementation bound to exactly one chain.
///
/// Adaptors are created once at startup and shared as `Arc<dyn ChainAdaptor>`
/// across concurrent calls, so implementations must handle their own
/// internal synchronization. Anticipated failures are reported either as an
/// error-class reply or as an `AdaptorError`; adaptors must not panic.
#[async_trait]
pub trait ChainAdaptor: Send + Sync {
	/// Chain this adaptor was bound to at construction.
	fn chain_name(&self) -> &str;

	async fn get_support_chains(
		&self,
		request: SupportChainsRequest,
	) -> AdaptorResult<SupportChainsResponse>;

	async fn convert_address(
		&self,
		request: ConvertAddressRequest,
	) -> AdaptorResult<ConvertAddressResponse>;

	async fn valid_address(&self, request: ValidAddressRequest)
		-> AdaptorResult<ValidAddressResponse>;

	async fn get_fee(&self, request: FeeRequest) -> AdaptorResult<FeeResponse>;

	async fn get_account(&self, request: AccountRequest) -> AdaptorResult<AccountResponse>;

	async fn get_unspent_outputs(
		&self,
		request: UnspentOutputsRequest,
	) -> AdaptorResult<UnspentOutputsResponse>;

	async fn get_block_by_number(&self, request: BlockNumberRequest)
		-> AdaptorResult<BlockResponse>;

	async fn get_block_by_hash(&self, request: BlockHashRequest) -> AdaptorResult<BlockResponse>;

	async fn get_block_header_by_hash(
		&self,
		request: BlockHeaderHashRequest,
	) -> AdaptorResult<BlockHeaderResponse>;

	async fn get_block_header_by_number(
		&self,
		request: BlockHeaderNumberRequest,
	) -> AdaptorResult<BlockHeaderResponse>;

	async fn send_tx(&self, request: SendTxRequest) -> AdaptorResult<SendTxResponse>;

	async fn get_tx_by_address(&self, request: TxAddressRequest)
		-> AdaptorResult<TxAddressResponse>;

	async fn get_tx_by_hash(&self, request: TxHashRequest) -> AdaptorResult<TxHashResponse>;

	async fn create_unsign_transaction(
		&self,
		request: UnSignTransactionRequest,
	) -> AdaptorResult<UnSignTransactionResponse>;

	async fn build_signed_transaction(
		&self,
		request: SignedTransactionRequest,
	) -> AdaptorResult<SignedTransactionResponse>;

	async fn decode_transaction(
		&self,
		request: DecodeTransactionRequest,
	) -> AdaptorResult<DecodeTransactionResponse>;

	async fn verify_signed_transaction(
		&self,
		request: VerifyTransactionRequest,
	) -> AdaptorResult<VerifyTransactionResponse>;
}

/// Named constructor for one kind of adaptor.
///
/// Construction must be a pure function of the configuration: it returns a
/// ready-to-use adaptor or a construction error.
pub trait AdaptorFactory: Send + Sync {
	/// Chain name this factory answers to.
	fn chain_name(&self) -> &'static str;

	fn create_adaptor(&self, config: &GatewayConfig) -> AdaptorResult<Arc<dyn ChainAdaptor>>;
}
