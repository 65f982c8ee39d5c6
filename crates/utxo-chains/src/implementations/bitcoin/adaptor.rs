//! `ChainAdaptor` implementation over node RPC.

use super::client::RpcClient;
use super::explorer::ExplorerClient;
use super::types::{
	cost_fee, fee_rate_to_sat_per_vbyte, resolve_inputs, transaction_list_from_block_tx,
	tx_message_from_raw, vout_from_raw, AddressValidation, RawBlock, RawBlockHeader,
	RawTransaction, SmartFeeEstimate,
};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};
use utxo_types::*;

/// Confirmation targets, in blocks, for the fast, normal and slow fee tiers.
const FEE_TARGETS: [u64; 3] = [1, 3, 6];

/// Fee estimation style of the node software behind the adaptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFlavor {
	/// `estimatesmartfee <target>`, one estimate per confirmation target
	Bitcoin,
	/// `estimatefee`, a single network-wide rate
	BitcoinCash,
}

impl NodeFlavor {
	/// Chain short name used by the block explorer.
	pub fn explorer_symbol(self) -> &'static str {
		match self {
			NodeFlavor::Bitcoin => "BTC",
			NodeFlavor::BitcoinCash => "BCH",
		}
	}
}

/// Bitcoin-family adaptor answering from a full node, plus a block explorer
/// for address-level queries when one is configured.
///
/// Operations that need script construction, or an explorer that is not
/// configured, are answered with an error-class reply rather than an error.
#[derive(Debug)]
pub struct NodeAdaptor {
	chain: String,
	network: String,
	flavor: NodeFlavor,
	client: RpcClient,
	explorer: Option<ExplorerClient>,
}

impl NodeAdaptor {
	/// Builds the adaptor from `config.wallet_node[chain]`.
	///
	/// # Errors
	///
	/// Returns `AdaptorError::Config` if the chain has no node section or an
	/// HTTP client cannot be built. No connection is attempted.
	pub fn new(chain: &str, flavor: NodeFlavor, config: &GatewayConfig) -> AdaptorResult<Self> {
		let node = config.node(chain).ok_or_else(|| {
			AdaptorError::Config(format!("No wallet_node section for chain '{}'", chain))
		})?;
		let client = RpcClient::new(node)?;
		let explorer = ExplorerClient::new(flavor.explorer_symbol(), node)?;

		info!(
			chain = %chain,
			network = %config.network,
			rpc_url = %client.url(),
			explorer = explorer.as_ref().map(ExplorerClient::base_url).unwrap_or("none"),
			"Created node adaptor"
		);

		Ok(Self {
			chain: chain.to_string(),
			network: config.network.clone(),
			flavor,
			client,
			explorer,
		})
	}

	fn not_supported<R: Reply>(&self, operation: &str) -> AdaptorResult<R> {
		warn!(chain = %self.chain, operation, "Operation not supported by node adaptor");
		Ok(R::failure(format!(
			"{} is not supported by {} node adaptor",
			operation, self.chain
		)))
	}

	/// Fast, normal and slow rates in coin per kvB.
	async fn fee_rates(&self) -> AdaptorResult<[f64; 3]> {
		match self.flavor {
			NodeFlavor::Bitcoin => {
				let mut rates = [0.0; 3];
				for (rate, target) in rates.iter_mut().zip(FEE_TARGETS) {
					let estimate: SmartFeeEstimate =
						self.client.call("estimatesmartfee", json!([target])).await?;
					*rate = estimate.feerate.ok_or_else(|| {
						AdaptorError::Rpc(format!(
							"estimatesmartfee returned no estimate for {} blocks: {}",
							target,
							estimate.errors.join("; ")
						))
					})?;
				}
				Ok(rates)
			}
			NodeFlavor::BitcoinCash => {
				let rate: f64 = self.client.call("estimatefee", json!([])).await?;
				Ok([rate; 3])
			}
		}
	}

	async fn block_by_hash(&self, hash: &str, view_tx: bool) -> AdaptorResult<BlockResponse> {
		let verbosity = if view_tx { 2 } else { 1 };
		let block: RawBlock = self.client.call("getblock", json!([hash, verbosity])).await?;

		Ok(BlockResponse {
			hash: block.hash,
			height: block.height,
			tx_list: block
				.tx
				.into_iter()
				.map(transaction_list_from_block_tx)
				.collect(),
			..Default::default()
		})
	}

	async fn block_header(&self, hash: &str) -> AdaptorResult<BlockHeaderResponse> {
		let header: RawBlockHeader = self
			.client
			.call("getblockheader", json!([hash, true]))
			.await?;

		Ok(BlockHeaderResponse {
			parent_hash: header.previousblockhash.unwrap_or_default(),
			number: header.height.to_string(),
			block_hash: header.hash,
			merkle_root: header.merkleroot,
			..Default::default()
		})
	}
}

#[async_trait]
impl ChainAdaptor for NodeAdaptor {
	fn chain_name(&self) -> &str {
		&self.chain
	}

	async fn get_support_chains(
		&self,
		_request: SupportChainsRequest,
	) -> AdaptorResult<SupportChainsResponse> {
		Ok(SupportChainsResponse {
			msg: format!("{} is supported on {}", self.chain, self.network),
			support: true,
			..Default::default()
		})
	}

	async fn convert_address(
		&self,
		_request: ConvertAddressRequest,
	) -> AdaptorResult<ConvertAddressResponse> {
		self.not_supported("ConvertAddress")
	}

	async fn valid_address(&self, request: ValidAddressRequest) -> AdaptorResult<ValidAddressResponse> {
		let validation: AddressValidation = self
			.client
			.call("validateaddress", json!([request.address]))
			.await?;

		Ok(ValidAddressResponse {
			msg: "valid address success".to_string(),
			valid: validation.isvalid,
			..Default::default()
		})
	}

	async fn get_fee(&self, _request: FeeRequest) -> AdaptorResult<FeeResponse> {
		let [fast, normal, slow] = self.fee_rates().await?;
		debug!(chain = %self.chain, fast, normal, slow, "Estimated fee rates");

		let fast_sat = fee_rate_to_sat_per_vbyte(fast);
		Ok(FeeResponse {
			msg: "get fee success".to_string(),
			best_fee: fast.to_string(),
			best_fee_sat: fast_sat.to_string(),
			slow_fee: fee_rate_to_sat_per_vbyte(slow).to_string(),
			normal_fee: fee_rate_to_sat_per_vbyte(normal).to_string(),
			fast_fee: fast_sat.to_string(),
			..Default::default()
		})
	}

	async fn get_account(&self, request: AccountRequest) -> AdaptorResult<AccountResponse> {
		let Some(explorer) = &self.explorer else {
			return self.not_supported("GetAccount");
		};
		let balance = explorer.balance(&request.address).await?;

		Ok(AccountResponse {
			msg: "get account success".to_string(),
			network: self.network.clone(),
			balance: balance.to_string(),
			..Default::default()
		})
	}

	async fn get_unspent_outputs(
		&self,
		request: UnspentOutputsRequest,
	) -> AdaptorResult<UnspentOutputsResponse> {
		let Some(explorer) = &self.explorer else {
			return self.not_supported("GetUnspentOutputs");
		};
		let unspent_outputs = explorer.unspent_outputs(&request.address).await?;

		Ok(UnspentOutputsResponse {
			msg: "get unspent outputs success".to_string(),
			unspent_outputs,
			..Default::default()
		})
	}

	async fn get_block_by_number(&self, request: BlockNumberRequest) -> AdaptorResult<BlockResponse> {
		if request.height < 0 {
			return Err(AdaptorError::InvalidRequest(format!(
				"Block height must not be negative, got {}",
				request.height
			)));
		}

		let hash: String = self
			.client
			.call("getblockhash", json!([request.height]))
			.await?;
		let mut response = self.block_by_hash(&hash, request.view_tx).await?;
		response.msg = "get block by number success".to_string();
		Ok(response)
	}

	async fn get_block_by_hash(&self, request: BlockHashRequest) -> AdaptorResult<BlockResponse> {
		let mut response = self.block_by_hash(&request.hash, request.view_tx).await?;
		response.msg = "get block by hash success".to_string();
		Ok(response)
	}

	async fn get_block_header_by_hash(
		&self,
		request: BlockHeaderHashRequest,
	) -> AdaptorResult<BlockHeaderResponse> {
		let mut response = self.block_header(&request.hash).await?;
		response.msg = "get block header by hash success".to_string();
		Ok(response)
	}

	async fn get_block_header_by_number(
		&self,
		request: BlockHeaderNumberRequest,
	) -> AdaptorResult<BlockHeaderResponse> {
		// Negative heights ask for the chain tip
		let hash: String = if request.height < 0 {
			self.client.call("getbestblockhash", json!([])).await?
		} else {
			self.client
				.call("getblockhash", json!([request.height]))
				.await?
		};

		let mut response = self.block_header(&hash).await?;
		response.msg = "get block header by number success".to_string();
		Ok(response)
	}

	async fn send_tx(&self, request: SendTxRequest) -> AdaptorResult<SendTxResponse> {
		let tx_hash: String = self
			.client
			.call("sendrawtransaction", json!([request.raw_tx]))
			.await?;
		info!(chain = %self.chain, tx_hash = %tx_hash, "Broadcast transaction");

		Ok(SendTxResponse {
			msg: "send tx success".to_string(),
			tx_hash,
			..Default::default()
		})
	}

	async fn get_tx_by_address(&self, request: TxAddressRequest) -> AdaptorResult<TxAddressResponse> {
		let Some(explorer) = &self.explorer else {
			return self.not_supported("GetTxByAddress");
		};
		let tx = explorer
			.transactions(&request.address, request.page, request.pagesize)
			.await?;

		Ok(TxAddressResponse {
			msg: "get tx by address success".to_string(),
			tx,
			..Default::default()
		})
	}

	async fn get_tx_by_hash(&self, request: TxHashRequest) -> AdaptorResult<TxHashResponse> {
		let raw: RawTransaction = self
			.client
			.call("getrawtransaction", json!([request.hash, true]))
			.await?;

		Ok(TxHashResponse {
			msg: "get tx by hash success".to_string(),
			tx: Some(tx_message_from_raw(raw)),
			..Default::default()
		})
	}

	async fn create_unsign_transaction(
		&self,
		_request: UnSignTransactionRequest,
	) -> AdaptorResult<UnSignTransactionResponse> {
		self.not_supported("CreateUnSignTransaction")
	}

	async fn build_signed_transaction(
		&self,
		_request: SignedTransactionRequest,
	) -> AdaptorResult<SignedTransactionResponse> {
		self.not_supported("BuildSignedTransaction")
	}

	async fn decode_transaction(
		&self,
		request: DecodeTransactionRequest,
	) -> AdaptorResult<DecodeTransactionResponse> {
		if request.raw_data.is_empty() {
			return Err(AdaptorError::InvalidRequest(
				"raw_data must not be empty".to_string(),
			));
		}

		let raw: RawTransaction = self
			.client
			.call("decoderawtransaction", json!([hex::encode(&request.raw_data)]))
			.await?;

		let (vins, input_total) = resolve_inputs(&raw.vin, &request.vins)?;
		let cost_fee = cost_fee(input_total, &raw.vout)?;
		let vouts: Vec<Vout> = raw.vout.iter().map(vout_from_raw).collect();

		Ok(DecodeTransactionResponse {
			msg: "decode transaction success".to_string(),
			hash: raw.txid,
			status: TxStatus::Other,
			vins,
			vouts,
			cost_fee,
			..Default::default()
		})
	}

	async fn verify_signed_transaction(
		&self,
		_request: VerifyTransactionRequest,
	) -> AdaptorResult<VerifyTransactionResponse> {
		self.not_supported("VerifySignedTransaction")
	}
}
