//! Spy adaptor for exercising the dispatch path without a backend.
//!
//! Every operation records its own name and then behaves according to the
//! configured `SpyMode`. Successful replies carry the operation name in `msg`
//! so callers can tell which method was reached.

use async_trait::async_trait;
use std::sync::Mutex;
use utxo_types::*;

/// How a `SpyAdaptor` answers after recording a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyMode {
	/// Return a success reply naming the operation
	Succeed,
	/// Return `AdaptorError::Rpc` naming the operation
	Fail,
	/// Panic with a message naming the operation
	Panic,
}

#[derive(Debug)]
pub struct SpyAdaptor {
	chain: String,
	mode: SpyMode,
	calls: Mutex<Vec<&'static str>>,
}

impl SpyAdaptor {
	pub fn new(chain: impl Into<String>) -> Self {
		Self::with_mode(chain, SpyMode::Succeed)
	}

	pub fn with_mode(chain: impl Into<String>, mode: SpyMode) -> Self {
		Self {
			chain: chain.into(),
			mode,
			calls: Mutex::new(Vec::new()),
		}
	}

	/// Operations invoked so far, in call order.
	pub fn calls(&self) -> Vec<&'static str> {
		self.calls
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls().len()
	}

	fn record(&self, operation: &'static str) -> AdaptorResult<()> {
		self.calls
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push(operation);

		match self.mode {
			SpyMode::Succeed => Ok(()),
			SpyMode::Fail => Err(AdaptorError::Rpc(format!("{} failed", operation))),
			SpyMode::Panic => panic!("{} exploded", operation),
		}
	}
}

#[async_trait]
impl ChainAdaptor for SpyAdaptor {
	fn chain_name(&self) -> &str {
		&self.chain
	}

	async fn get_support_chains(
		&self,
		_request: SupportChainsRequest,
	) -> AdaptorResult<SupportChainsResponse> {
		self.record("get_support_chains")?;
		Ok(SupportChainsResponse {
			msg: "get_support_chains".to_string(),
			support: true,
			..Default::default()
		})
	}

	async fn convert_address(
		&self,
		request: ConvertAddressRequest,
	) -> AdaptorResult<ConvertAddressResponse> {
		self.record("convert_address")?;
		Ok(ConvertAddressResponse {
			msg: "convert_address".to_string(),
			address: format!("addr-{}", hex::encode(&request.public_key)),
			..Default::default()
		})
	}

	async fn valid_address(&self, _request: ValidAddressRequest) -> AdaptorResult<ValidAddressResponse> {
		self.record("valid_address")?;
		Ok(ValidAddressResponse {
			msg: "valid_address".to_string(),
			valid: true,
			..Default::default()
		})
	}

	async fn get_fee(&self, _request: FeeRequest) -> AdaptorResult<FeeResponse> {
		self.record("get_fee")?;
		Ok(FeeResponse {
			msg: "get_fee".to_string(),
			best_fee: "0.00012".to_string(),
			best_fee_sat: "12".to_string(),
			slow_fee: "4".to_string(),
			normal_fee: "8".to_string(),
			fast_fee: "12".to_string(),
			..Default::default()
		})
	}

	async fn get_account(&self, request: AccountRequest) -> AdaptorResult<AccountResponse> {
		self.record("get_account")?;
		Ok(AccountResponse {
			msg: "get_account".to_string(),
			network: request.network,
			balance: "100000".to_string(),
			..Default::default()
		})
	}

	async fn get_unspent_outputs(
		&self,
		request: UnspentOutputsRequest,
	) -> AdaptorResult<UnspentOutputsResponse> {
		self.record("get_unspent_outputs")?;
		Ok(UnspentOutputsResponse {
			msg: "get_unspent_outputs".to_string(),
			unspent_outputs: vec![UnspentOutput {
				address: request.address,
				unspent_amount: "5000".to_string(),
				..Default::default()
			}],
			..Default::default()
		})
	}

	async fn get_block_by_number(&self, request: BlockNumberRequest) -> AdaptorResult<BlockResponse> {
		self.record("get_block_by_number")?;
		Ok(BlockResponse {
			msg: "get_block_by_number".to_string(),
			height: request.height.max(0) as u64,
			..Default::default()
		})
	}

	async fn get_block_by_hash(&self, request: BlockHashRequest) -> AdaptorResult<BlockResponse> {
		self.record("get_block_by_hash")?;
		Ok(BlockResponse {
			msg: "get_block_by_hash".to_string(),
			hash: request.hash,
			..Default::default()
		})
	}

	async fn get_block_header_by_hash(
		&self,
		request: BlockHeaderHashRequest,
	) -> AdaptorResult<BlockHeaderResponse> {
		self.record("get_block_header_by_hash")?;
		Ok(BlockHeaderResponse {
			msg: "get_block_header_by_hash".to_string(),
			block_hash: request.hash,
			..Default::default()
		})
	}

	async fn get_block_header_by_number(
		&self,
		request: BlockHeaderNumberRequest,
	) -> AdaptorResult<BlockHeaderResponse> {
		self.record("get_block_header_by_number")?;
		Ok(BlockHeaderResponse {
			msg: "get_block_header_by_number".to_string(),
			number: request.height.to_string(),
			..Default::default()
		})
	}

	async fn send_tx(&self, _request: SendTxRequest) -> AdaptorResult<SendTxResponse> {
		self.record("send_tx")?;
		Ok(SendTxResponse {
			msg: "send_tx".to_string(),
			tx_hash: "f00d".to_string(),
			..Default::default()
		})
	}

	async fn get_tx_by_address(&self, _request: TxAddressRequest) -> AdaptorResult<TxAddressResponse> {
		self.record("get_tx_by_address")?;
		Ok(TxAddressResponse {
			msg: "get_tx_by_address".to_string(),
			..Default::default()
		})
	}

	async fn get_tx_by_hash(&self, request: TxHashRequest) -> AdaptorResult<TxHashResponse> {
		self.record("get_tx_by_hash")?;
		Ok(TxHashResponse {
			msg: "get_tx_by_hash".to_string(),
			tx: Some(TxMessage {
				hash: request.hash,
				status: TxStatus::Success,
				..Default::default()
			}),
			..Default::default()
		})
	}

	async fn create_unsign_transaction(
		&self,
		_request: UnSignTransactionRequest,
	) -> AdaptorResult<UnSignTransactionResponse> {
		self.record("create_unsign_transaction")?;
		Ok(UnSignTransactionResponse {
			msg: "create_unsign_transaction".to_string(),
			tx_data: vec![0x02, 0x00],
			sign_hashes: vec![vec![0xab; 32]],
			..Default::default()
		})
	}

	async fn build_signed_transaction(
		&self,
		request: SignedTransactionRequest,
	) -> AdaptorResult<SignedTransactionResponse> {
		self.record("build_signed_transaction")?;
		Ok(SignedTransactionResponse {
			msg: "build_signed_transaction".to_string(),
			signed_tx_data: request.tx_data,
			hash: "beef".to_string(),
			..Default::default()
		})
	}

	async fn decode_transaction(
		&self,
		request: DecodeTransactionRequest,
	) -> AdaptorResult<DecodeTransactionResponse> {
		self.record("decode_transaction")?;
		Ok(DecodeTransactionResponse {
			msg: "decode_transaction".to_string(),
			vins: request.vins,
			status: TxStatus::Other,
			..Default::default()
		})
	}

	async fn verify_signed_transaction(
		&self,
		_request: VerifyTransactionRequest,
	) -> AdaptorResult<VerifyTransactionResponse> {
		self.record("verify_signed_transaction")?;
		Ok(VerifyTransactionResponse {
			msg: "verify_signed_transaction".to_string(),
			verify: true,
			..Default::default()
		})
	}
}
