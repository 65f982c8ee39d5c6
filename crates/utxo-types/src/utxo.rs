//! Request and response messages of the wallet UTXO service.
//!
//! Every request names its chain (`HasChain`) and every response carries a
//! `ReturnCode` plus a message (`Reply`). All fields default to their zero
//! value when absent on the wire.

use crate::chain::HasChain;
use crate::common::{hex_bytes, hex_bytes_list, Reply, ReturnCode};
use serde::{Deserialize, Serialize};

/// Transaction input reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vin {
	pub hash: String,
	pub index: u32,
	pub amount: i64,
	pub address: String,
}

/// Transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vout {
	pub address: String,
	pub amount: i64,
	pub index: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
	#[default]
	NotFound,
	Pending,
	Failed,
	Success,
	ContractExecuteFailed,
	Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
	pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Value {
	pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxMessage {
	pub hash: String,
	pub index: u32,
	pub froms: Vec<Address>,
	pub tos: Vec<Address>,
	pub values: Vec<Value>,
	pub fee: String,
	pub status: TxStatus,
	#[serde(rename = "type")]
	pub tx_type: i32,
	pub height: String,
	pub brc20_address: String,
	pub datetime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnspentOutput {
	pub tx_hash_big_endian: String,
	pub tx_id: String,
	pub tx_output_n: u64,
	pub script: String,
	pub height: String,
	pub block_time: String,
	pub address: String,
	pub unspent_amount: String,
	pub value_hex: String,
	pub confirmations: u64,
	pub index: u64,
}

/// Transaction summary inside a block reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionList {
	pub hash: String,
	pub fee: String,
	pub vin: Vec<Vin>,
	pub vout: Vec<Vout>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportChainsRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertAddressRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub format: String,
	#[serde(with = "hex_bytes")]
	pub public_key: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidAddressRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub format: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeRequest {
	pub consumer_token: String,
	pub chain: String,
	pub coin: String,
	pub network: String,
	pub raw_tx: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub address: String,
	pub brc20_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnspentOutputsRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockNumberRequest {
	pub consumer_token: String,
	pub chain: String,
	pub height: i64,
	pub view_tx: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHashRequest {
	pub consumer_token: String,
	pub chain: String,
	pub hash: String,
	pub view_tx: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeaderHashRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeaderNumberRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub height: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendTxRequest {
	pub consumer_token: String,
	pub chain: String,
	pub coin: String,
	pub network: String,
	pub raw_tx: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxAddressRequest {
	pub consumer_token: String,
	pub chain: String,
	pub coin: String,
	pub network: String,
	pub address: String,
	pub brc20_address: String,
	pub page: u32,
	pub pagesize: u32,
	pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxHashRequest {
	pub consumer_token: String,
	pub chain: String,
	pub coin: String,
	pub network: String,
	pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnSignTransactionRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub fee: String,
	pub vin: Vec<Vin>,
	pub vout: Vec<Vout>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedTransactionRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	#[serde(with = "hex_bytes")]
	pub tx_data: Vec<u8>,
	#[serde(with = "hex_bytes_list")]
	pub signatures: Vec<Vec<u8>>,
	#[serde(with = "hex_bytes_list")]
	pub public_keys: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeTransactionRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	#[serde(with = "hex_bytes")]
	pub raw_data: Vec<u8>,
	pub vins: Vec<Vin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyTransactionRequest {
	pub consumer_token: String,
	pub chain: String,
	pub network: String,
	pub public_key: String,
	pub signature: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportChainsResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub support: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertAddressResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidAddressResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub best_fee: String,
	pub best_fee_sat: String,
	pub slow_fee: String,
	pub normal_fee: String,
	pub fast_fee: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub network: String,
	pub balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnspentOutputsResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub unspent_outputs: Vec<UnspentOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub hash: String,
	pub height: u64,
	pub tx_list: Vec<TransactionList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeaderResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub parent_hash: String,
	pub number: String,
	pub block_hash: String,
	pub merkle_root: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendTxResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub tx_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxAddressResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub tx: Vec<TxMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxHashResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub tx: Option<TxMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnSignTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	#[serde(with = "hex_bytes")]
	pub tx_data: Vec<u8>,
	#[serde(with = "hex_bytes_list")]
	pub sign_hashes: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	#[serde(with = "hex_bytes")]
	pub signed_tx_data: Vec<u8>,
	pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub hash: String,
	pub status: TxStatus,
	pub vins: Vec<Vin>,
	pub vouts: Vec<Vout>,
	#[serde(with = "hex_bytes_list")]
	pub sign_hashes: Vec<Vec<u8>>,
	pub cost_fee: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyTransactionResponse {
	pub code: ReturnCode,
	pub msg: String,
	pub verify: bool,
}

macro_rules! impl_has_chain {
	($($request:ty),* $(,)?) => {
		$(
			impl HasChain for $request {
				fn chain(&self) -> &str {
					&self.chain
				}
			}
		)*
	};
}

macro_rules! impl_reply {
	($($response:ty),* $(,)?) => {
		$(
			impl Reply for $response {
				fn code(&self) -> ReturnCode {
					self.code
				}

				fn msg(&self) -> &str {
					&self.msg
				}

				fn failure(msg: impl Into<String>) -> Self {
					Self {
						code: ReturnCode::Error,
						msg: msg.into(),
						..Default::default()
					}
				}
			}
		)*
	};
}

impl_has_chain!(
	SupportChainsRequest,
	ConvertAddressRequest,
	ValidAddressRequest,
	FeeRequest,
	AccountRequest,
	UnspentOutputsRequest,
	BlockNumberRequest,
	BlockHashRequest,
	BlockHeaderHashRequest,
	BlockHeaderNumberRequest,
	SendTxRequest,
	TxAddressRequest,
	TxHashRequest,
	UnSignTransactionRequest,
	SignedTransactionRequest,
	DecodeTransactionRequest,
	VerifyTransactionRequest,
);

impl_reply!(
	SupportChainsResponse,
	ConvertAddressResponse,
	ValidAddressResponse,
	FeeResponse,
	AccountResponse,
	UnspentOutputsResponse,
	BlockResponse,
	BlockHeaderResponse,
	SendTxResponse,
	TxAddressResponse,
	TxHashResponse,
	UnSignTransactionResponse,
	SignedTransactionResponse,
	DecodeTransactionResponse,
	VerifyTransactionResponse,
);
