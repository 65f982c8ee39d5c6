//! Node RPC result shapes and their conversion into gateway messages.

use serde::Deserialize;
use utxo_types::{
	AdaptorError, AdaptorResult, Address, TransactionList, TxMessage, TxStatus, Value, Vin, Vout,
};

const SATS_PER_COIN: f64 = 100_000_000.0;

/// Result of `estimatesmartfee`.
#[derive(Debug, Clone, Deserialize)]
pub struct SmartFeeEstimate {
	/// Coin per kvB
	pub feerate: Option<f64>,
	#[serde(default)]
	pub errors: Vec<String>,
}

/// Result of `validateaddress`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressValidation {
	pub isvalid: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptPubKey {
	/// Single destination, reported by recent bitcoin nodes
	pub address: Option<String>,
	/// Destination list, reported by older nodes and bitcoin cash nodes
	#[serde(default)]
	pub addresses: Vec<String>,
}

impl ScriptPubKey {
	pub fn destination(&self) -> String {
		self.address
			.clone()
			.or_else(|| self.addresses.first().cloned())
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVin {
	pub txid: Option<String>,
	pub vout: Option<u32>,
	pub coinbase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVout {
	pub value: f64,
	pub n: u32,
	#[serde(rename = "scriptPubKey", default)]
	pub script_pub_key: ScriptPubKey,
}

/// Verbose transaction as returned by `getrawtransaction`, `decoderawtransaction`
/// and `getblock` at verbosity 2.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
	pub txid: String,
	#[serde(default)]
	pub vin: Vec<RawVin>,
	#[serde(default)]
	pub vout: Vec<RawVout>,
	/// Coin, present inside `getblock` verbosity 2 for non-coinbase transactions
	pub fee: Option<f64>,
	pub confirmations: Option<u64>,
	pub blocktime: Option<u64>,
}

/// Block transactions are ids at verbosity 1 and objects at verbosity 2.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BlockTx {
	Full(RawTransaction),
	Id(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
	pub hash: String,
	pub height: u64,
	#[serde(default)]
	pub tx: Vec<BlockTx>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBlockHeader {
	pub hash: String,
	pub height: u64,
	pub previousblockhash: Option<String>,
	pub merkleroot: String,
}

pub fn coin_to_sat(value: f64) -> i64 {
	(value * SATS_PER_COIN).round() as i64
}

/// Converts a coin-per-kvB fee rate to whole sat/vB, never below 1.
pub fn fee_rate_to_sat_per_vbyte(coin_per_kvb: f64) -> u64 {
	let sat_per_vbyte = (coin_per_kvb * SATS_PER_COIN / 1000.0).ceil();
	if sat_per_vbyte < 1.0 {
		1
	} else {
		sat_per_vbyte as u64
	}
}

pub fn vin_from_raw(raw: &RawVin) -> Vin {
	Vin {
		hash: raw.txid.clone().unwrap_or_default(),
		index: raw.vout.unwrap_or_default(),
		..Default::default()
	}
}

pub fn vout_from_raw(raw: &RawVout) -> Vout {
	Vout {
		address: raw.script_pub_key.destination(),
		amount: coin_to_sat(raw.value),
		index: raw.n,
	}
}

pub fn transaction_list_from_block_tx(tx: BlockTx) -> TransactionList {
	match tx {
		BlockTx::Id(hash) => TransactionList {
			hash,
			..Default::default()
		},
		BlockTx::Full(raw) => TransactionList {
			fee: raw
				.fee
				.map(|fee| coin_to_sat(fee).to_string())
				.unwrap_or_default(),
			vin: raw
				.vin
				.iter()
				.filter(|vin| vin.coinbase.is_none())
				.map(vin_from_raw)
				.collect(),
			vout: raw.vout.iter().map(vout_from_raw).collect(),
			hash: raw.txid,
		},
	}
}

pub fn tx_message_from_raw(raw: RawTransaction) -> TxMessage {
	let status = match raw.confirmations {
		Some(confirmations) if confirmations > 0 => TxStatus::Success,
		_ => TxStatus::Pending,
	};

	TxMessage {
		hash: raw.txid,
		tos: raw
			.vout
			.iter()
			.map(|vout| Address {
				address: vout.script_pub_key.destination(),
			})
			.collect(),
		values: raw
			.vout
			.iter()
			.map(|vout| Value {
				value: coin_to_sat(vout.value).to_string(),
			})
			.collect(),
		fee: raw
			.fee
			.map(|fee| coin_to_sat(fee).to_string())
			.unwrap_or_default(),
		status,
		datetime: raw.blocktime.map(|t| t.to_string()).unwrap_or_default(),
		..Default::default()
	}
}

/// Fills decoded inputs from the caller-supplied `known` inputs and sums their
/// amounts when every input is known.
///
/// # Errors
///
/// Returns `AdaptorError::InvalidRequest` for a negative known amount or when
/// the input total does not fit in an `i64`.
pub fn resolve_inputs(decoded: &[RawVin], known: &[Vin]) -> AdaptorResult<(Vec<Vin>, Option<i64>)> {
	let mut all_known = true;
	let mut vins = Vec::with_capacity(decoded.len());
	for raw in decoded {
		let mut vin = vin_from_raw(raw);
		match known
			.iter()
			.find(|k| k.hash == vin.hash && k.index == vin.index)
		{
			Some(k) if k.amount < 0 => {
				return Err(AdaptorError::InvalidRequest(format!(
					"Input {}:{} has negative amount {}",
					k.hash, k.index, k.amount
				)));
			}
			Some(k) => {
				vin.amount = k.amount;
				vin.address = k.address.clone();
			}
			None => all_known = false,
		}
		vins.push(vin);
	}

	if !all_known || vins.is_empty() {
		return Ok((vins, None));
	}

	let input_total = vins
		.iter()
		.try_fold(0i64, |total, vin| total.checked_add(vin.amount))
		.ok_or_else(|| AdaptorError::InvalidRequest("Input amounts overflow".to_string()))?;
	Ok((vins, Some(input_total)))
}

/// Fee paid by a decoded transaction, or 0 when the input total is unknown.
///
/// # Errors
///
/// Returns `AdaptorError::InvalidRequest` when the output total or the
/// difference does not fit in an `i64`.
pub fn cost_fee(input_total: Option<i64>, vouts: &[RawVout]) -> AdaptorResult<i64> {
	let Some(input_total) = input_total else {
		return Ok(0);
	};

	let output_total = vouts
		.iter()
		.try_fold(0i64, |total, vout| total.checked_add(coin_to_sat(vout.value)))
		.ok_or_else(|| AdaptorError::InvalidRequest("Output amounts overflow".to_string()))?;

	input_total
		.checked_sub(output_total)
		.ok_or_else(|| AdaptorError::InvalidRequest("Transaction fee overflows".to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_coin_to_sat_rounds() {
		assert_eq!(coin_to_sat(0.1), 10_000_000);
		assert_eq!(coin_to_sat(0.00000001), 1);
		assert_eq!(coin_to_sat(21.0), 2_100_000_000);
	}

	#[test]
	fn test_fee_rate_conversion() {
		// 0.00012 coin/kvB = 12 sat/vB
		assert_eq!(fee_rate_to_sat_per_vbyte(0.00012), 12);
		assert_eq!(fee_rate_to_sat_per_vbyte(0.000001), 1);
		assert_eq!(fee_rate_to_sat_per_vbyte(0.000125), 13);
	}

	#[test]
	fn test_script_destination_variants() {
		let modern: ScriptPubKey = serde_json::from_str(r#"{"address":"bc1qxyz"}"#).unwrap();
		assert_eq!(modern.destination(), "bc1qxyz");

		let legacy: ScriptPubKey =
			serde_json::from_str(r#"{"addresses":["bitcoincash:qabc"]}"#).unwrap();
		assert_eq!(legacy.destination(), "bitcoincash:qabc");

		let nulldata: ScriptPubKey = serde_json::from_str(r#"{"type":"nulldata"}"#).unwrap();
		assert_eq!(nulldata.destination(), "");
	}

	#[test]
	fn test_block_tx_variants() {
		let block: RawBlock = serde_json::from_str(
			r#"{
				"hash": "00000000abc",
				"height": 100,
				"tx": [
					"aaaa",
					{
						"txid": "bbbb",
						"fee": 0.0001,
						"vin": [{"txid": "cccc", "vout": 1}],
						"vout": [{"value": 0.5, "n": 0, "scriptPubKey": {"address": "bc1qdest"}}]
					}
				]
			}"#,
		)
		.unwrap();

		let txs: Vec<TransactionList> = block
			.tx
			.into_iter()
			.map(transaction_list_from_block_tx)
			.collect();
		assert_eq!(txs[0].hash, "aaaa");
		assert!(txs[0].vout.is_empty());

		assert_eq!(txs[1].hash, "bbbb");
		assert_eq!(txs[1].fee, "10000");
		assert_eq!(txs[1].vin[0].hash, "cccc");
		assert_eq!(txs[1].vin[0].index, 1);
		assert_eq!(
			txs[1].vout[0],
			Vout {
				address: "bc1qdest".to_string(),
				amount: 50_000_000,
				index: 0,
			}
		);
	}

	#[test]
	fn test_coinbase_inputs_dropped() {
		let tx: BlockTx = serde_json::from_str(
			r#"{"txid":"cb","vin":[{"coinbase":"03a0bb0d"}],"vout":[{"value":3.125,"n":0,"scriptPubKey":{}}]}"#,
		)
		.unwrap();
		let list = transaction_list_from_block_tx(tx);
		assert!(list.vin.is_empty());
		assert_eq!(list.vout[0].amount, 312_500_000);
	}

	#[test]
	fn test_tx_message_status() {
		let raw: RawTransaction = serde_json::from_str(
			r#"{"txid":"dd","vout":[{"value":1.0,"n":0,"scriptPubKey":{"address":"bc1qa"}}],"confirmations":3,"blocktime":1700000000}"#,
		)
		.unwrap();
		let message = tx_message_from_raw(raw);
		assert_eq!(message.status, TxStatus::Success);
		assert_eq!(message.tos[0].address, "bc1qa");
		assert_eq!(message.values[0].value, "100000000");
		assert_eq!(message.datetime, "1700000000");

		let mempool: RawTransaction = serde_json::from_str(r#"{"txid":"ee"}"#).unwrap();
		assert_eq!(tx_message_from_raw(mempool).status, TxStatus::Pending);
	}

	#[test]
	fn test_resolve_inputs() {
		let decoded = vec![
			RawVin {
				txid: Some("aa".to_string()),
				vout: Some(0),
				coinbase: None,
			},
			RawVin {
				txid: Some("bb".to_string()),
				vout: Some(2),
				coinbase: None,
			},
		];
		let known = vec![
			Vin {
				hash: "aa".to_string(),
				index: 0,
				amount: 7000,
				address: "addr-a".to_string(),
			},
			Vin {
				hash: "bb".to_string(),
				index: 2,
				amount: 3000,
				address: "addr-b".to_string(),
			},
		];

		let (vins, total) = resolve_inputs(&decoded, &known).unwrap();
		assert_eq!(total, Some(10_000));
		assert_eq!(vins[1].address, "addr-b");

		let (_, partial) = resolve_inputs(&decoded, &known[..1]).unwrap();
		assert_eq!(partial, None);
	}

	fn spent(hash: &str, amount: i64) -> (RawVin, Vin) {
		let raw = RawVin {
			txid: Some(hash.to_string()),
			vout: Some(0),
			coinbase: None,
		};
		let vin = Vin {
			hash: hash.to_string(),
			index: 0,
			amount,
			address: String::new(),
		};
		(raw, vin)
	}

	#[test]
	fn test_resolve_inputs_total_overflow() {
		let (raw_a, vin_a) = spent("aa", i64::MAX);
		let (raw_b, vin_b) = spent("bb", 1);

		let result = resolve_inputs(&[raw_a, raw_b], &[vin_a, vin_b]);
		assert!(matches!(result, Err(AdaptorError::InvalidRequest(ref msg)) if msg.contains("overflow")));
	}

	#[test]
	fn test_resolve_inputs_negative_amount() {
		let (raw, vin) = spent("aa", -5);

		let result = resolve_inputs(&[raw], &[vin]);
		assert!(matches!(result, Err(AdaptorError::InvalidRequest(ref msg)) if msg.contains("negative")));
	}

	#[test]
	fn test_cost_fee() {
		let vouts: Vec<RawVout> =
			serde_json::from_str(r#"[{"value":0.0009,"n":0},{"value":0.0001,"n":1}]"#).unwrap();

		assert_eq!(cost_fee(Some(101_000), &vouts).unwrap(), 1_000);
		assert_eq!(cost_fee(None, &vouts).unwrap(), 0);
		assert!(matches!(
			cost_fee(Some(i64::MIN), &vouts),
			Err(AdaptorError::InvalidRequest(_))
		));
	}
}
