//! Block-explorer client for address-level queries.
//!
//! A full node only indexes its own wallet, so balances, unspent outputs and
//! address history come from an OKLink-compatible explorer API instead. The
//! explorer reports amounts as decimal coin strings; they are converted to
//! satoshis here so replies carry the same units as the node-backed ones.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use utxo_types::{
	AdaptorError, AdaptorResult, Address, NodeConfig, TxMessage, TxStatus, UnspentOutput, Value,
};

const API_PREFIX: &str = "api/v5/explorer";
const ACCESS_KEY_HEADER: &str = "Ok-Access-Key";
const SUCCESS_CODE: &str = "0";
const COIN_DECIMALS: usize = 8;

/// Explorer client bound to one chain's short name (`BTC`, `BCH`).
#[derive(Debug, Clone)]
pub struct ExplorerClient {
	http: reqwest::Client,
	base_url: String,
	api_key: String,
	chain_short_name: &'static str,
}

#[derive(Debug, Deserialize)]
struct ExplorerEnvelope<T> {
	code: String,
	#[serde(default)]
	msg: String,
	#[serde(default = "Vec::new")]
	data: Vec<T>,
}

impl<T> ExplorerEnvelope<T> {
	fn into_first(self, endpoint: &str) -> AdaptorResult<T> {
		if self.code != SUCCESS_CODE {
			return Err(AdaptorError::Explorer(format!(
				"{} failed ({}): {}",
				endpoint, self.code, self.msg
			)));
		}
		self.data
			.into_iter()
			.next()
			.ok_or_else(|| AdaptorError::Explorer(format!("{} returned no data", endpoint)))
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSummary {
	#[serde(default)]
	pub address: String,
	pub balance: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoPage {
	#[serde(default)]
	pub utxo_list: Vec<ExplorerUtxo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerUtxo {
	pub txid: String,
	#[serde(default)]
	pub height: String,
	#[serde(default)]
	pub block_time: String,
	#[serde(default)]
	pub address: String,
	pub unspent_amount: String,
	pub index: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
	#[serde(default)]
	pub transaction_lists: Vec<ExplorerTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
	pub tx_id: String,
	#[serde(default)]
	pub height: String,
	#[serde(default)]
	pub transaction_time: String,
	/// Comma-separated input addresses
	#[serde(default)]
	pub from: String,
	/// Comma-separated output addresses
	#[serde(default)]
	pub to: String,
	#[serde(default)]
	pub amount: String,
	#[serde(default)]
	pub tx_fee: String,
	#[serde(default)]
	pub state: String,
}

impl ExplorerClient {
	/// Builds a client when both `data_api_url` and `data_api_key` are set.
	///
	/// Returns `Ok(None)` when either is empty, which leaves the explorer
	/// operations unsupported for the chain.
	pub fn new(chain_short_name: &'static str, node: &NodeConfig) -> AdaptorResult<Option<Self>> {
		let base_url = node.data_api_url.trim();
		if base_url.is_empty() || node.data_api_key.is_empty() {
			return Ok(None);
		}

		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(node.timeout_secs))
			.build()
			.map_err(|e| {
				error!(error = %e, "new explorer client fail");
				AdaptorError::Config(format!("Failed to build explorer client: {}", e))
			})?;

		Ok(Some(Self {
			http,
			base_url: base_url.trim_end_matches('/').to_string(),
			api_key: node.data_api_key.clone(),
			chain_short_name,
		}))
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	async fn get<T: DeserializeOwned>(
		&self,
		endpoint: &str,
		query: &[(&str, String)],
	) -> AdaptorResult<T> {
		let url = format!("{}/{}/{}", self.base_url, API_PREFIX, endpoint);
		debug!(endpoint, chain = self.chain_short_name, "explorer call");

		let mut params = vec![("chainShortName", self.chain_short_name.to_string())];
		params.extend(query.iter().cloned());

		let response = self
			.http
			.get(&url)
			.header(ACCESS_KEY_HEADER, &self.api_key)
			.query(&params)
			.send()
			.await
			.map_err(|e| {
				error!(endpoint, error = %e, "explorer request fail");
				AdaptorError::Explorer(format!("{} request failed: {}", endpoint, e))
			})?;

		let status = response.status();
		if !status.is_success() {
			error!(endpoint, %status, "explorer request rejected");
			return Err(AdaptorError::Explorer(format!(
				"{} returned HTTP {}",
				endpoint, status
			)));
		}

		let envelope: ExplorerEnvelope<T> = response.json().await.map_err(|e| {
			error!(endpoint, error = %e, "explorer response unreadable");
			AdaptorError::Explorer(format!("{} returned an unreadable body: {}", endpoint, e))
		})?;
		envelope.into_first(endpoint)
	}

	/// Confirmed balance of `address`, in satoshis.
	pub async fn balance(&self, address: &str) -> AdaptorResult<i64> {
		let summary: AddressSummary = self
			.get("address/address-summary", &[("address", address.to_string())])
			.await?;
		parse_coin_amount(&summary.balance)
	}

	pub async fn unspent_outputs(&self, address: &str) -> AdaptorResult<Vec<UnspentOutput>> {
		let page: UtxoPage = self
			.get("address/utxo", &[("address", address.to_string())])
			.await?;
		page.utxo_list.iter().map(unspent_output_from_explorer).collect()
	}

	/// One page of the address history. A zero `page` or `limit` leaves the
	/// explorer's default in place.
	pub async fn transactions(
		&self,
		address: &str,
		page: u32,
		limit: u32,
	) -> AdaptorResult<Vec<TxMessage>> {
		let mut query = vec![
			("address", address.to_string()),
			("protocolType", "transaction".to_string()),
		];
		if page > 0 {
			query.push(("page", page.to_string()));
		}
		if limit > 0 {
			query.push(("limit", limit.to_string()));
		}

		let history: TransactionPage = self.get("address/transaction-list", &query).await?;
		history
			.transaction_lists
			.iter()
			.map(tx_message_from_explorer)
			.collect()
	}
}

/// Parses a decimal coin string such as `"0.00012"` into satoshis without
/// going through floating point.
pub fn parse_coin_amount(amount: &str) -> AdaptorResult<i64> {
	let invalid = || AdaptorError::Explorer(format!("Invalid coin amount '{}'", amount));

	let trimmed = amount.trim();
	if trimmed.is_empty() {
		return Ok(0);
	}
	let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
	if fraction.len() > COIN_DECIMALS
		|| !whole.chars().all(|c| c.is_ascii_digit())
		|| !fraction.chars().all(|c| c.is_ascii_digit())
	{
		return Err(invalid());
	}

	let whole: i64 = if whole.is_empty() {
		0
	} else {
		whole.parse().map_err(|_| invalid())?
	};
	let fraction: i64 = format!("{:0<width$}", fraction, width = COIN_DECIMALS)
		.parse()
		.map_err(|_| invalid())?;

	whole
		.checked_mul(100_000_000)
		.and_then(|sats| sats.checked_add(fraction))
		.ok_or_else(invalid)
}

fn split_addresses(list: &str) -> Vec<Address> {
	list.split(',')
		.map(str::trim)
		.filter(|address| !address.is_empty())
		.map(|address| Address {
			address: address.to_string(),
		})
		.collect()
}

pub fn unspent_output_from_explorer(utxo: &ExplorerUtxo) -> AdaptorResult<UnspentOutput> {
	let index: u64 = utxo.index.trim().parse().map_err(|_| {
		AdaptorError::Explorer(format!("Invalid output index '{}' for {}", utxo.index, utxo.txid))
	})?;
	let amount = parse_coin_amount(&utxo.unspent_amount)?;

	Ok(UnspentOutput {
		tx_hash_big_endian: utxo.txid.clone(),
		tx_id: utxo.txid.clone(),
		tx_output_n: index,
		height: utxo.height.clone(),
		block_time: utxo.block_time.clone(),
		address: utxo.address.clone(),
		unspent_amount: amount.to_string(),
		value_hex: format!("{:x}", amount),
		index,
		..Default::default()
	})
}

pub fn tx_message_from_explorer(tx: &ExplorerTransaction) -> AdaptorResult<TxMessage> {
	let status = match tx.state.as_str() {
		"success" => TxStatus::Success,
		"fail" => TxStatus::Failed,
		"pending" => TxStatus::Pending,
		_ => TxStatus::Other,
	};

	Ok(TxMessage {
		hash: tx.tx_id.clone(),
		froms: split_addresses(&tx.from),
		tos: split_addresses(&tx.to),
		values: vec![Value {
			value: parse_coin_amount(&tx.amount)?.to_string(),
		}],
		fee: parse_coin_amount(&tx.tx_fee)?.to_string(),
		status,
		height: tx.height.clone(),
		datetime: tx.transaction_time.clone(),
		..Default::default()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn node_with_explorer(url: &str, key: &str) -> NodeConfig {
		NodeConfig {
			rpc_url: "127.0.0.1:1".to_string(),
			data_api_url: url.to_string(),
			data_api_key: key.to_string(),
			timeout_secs: 2,
			..Default::default()
		}
	}

	#[test]
	fn test_explorer_requires_url_and_key() {
		let without_key = node_with_explorer("https://www.oklink.com/", "");
		assert!(ExplorerClient::new("BTC", &without_key).unwrap().is_none());

		let without_url = node_with_explorer("", "key");
		assert!(ExplorerClient::new("BTC", &without_url).unwrap().is_none());

		let configured = node_with_explorer("https://www.oklink.com/", "key");
		let client = ExplorerClient::new("BTC", &configured).unwrap().unwrap();
		assert_eq!(client.base_url(), "https://www.oklink.com");
	}

	#[test]
	fn test_parse_coin_amount() {
		assert_eq!(parse_coin_amount("0.00012").unwrap(), 12_000);
		assert_eq!(parse_coin_amount("21").unwrap(), 2_100_000_000);
		assert_eq!(parse_coin_amount("1.5").unwrap(), 150_000_000);
		assert_eq!(parse_coin_amount(".00000001").unwrap(), 1);
		assert_eq!(parse_coin_amount("").unwrap(), 0);

		assert!(parse_coin_amount("0.000000001").is_err());
		assert!(parse_coin_amount("-1").is_err());
		assert!(parse_coin_amount("1e3").is_err());
		assert!(matches!(
			parse_coin_amount("99999999999999"),
			Err(AdaptorError::Explorer(_))
		));
	}

	#[test]
	fn test_transaction_conversion() {
		let tx: ExplorerTransaction = serde_json::from_str(
			r#"{
				"txId": "ab12",
				"height": "850000",
				"transactionTime": "1718000000000",
				"from": "bc1qfrom1,bc1qfrom2",
				"to": "bc1qto",
				"amount": "0.5",
				"txFee": "0.0000141",
				"state": "success"
			}"#,
		)
		.unwrap();

		let message = tx_message_from_explorer(&tx).unwrap();
		assert_eq!(message.hash, "ab12");
		assert_eq!(message.froms.len(), 2);
		assert_eq!(message.tos[0].address, "bc1qto");
		assert_eq!(message.values[0].value, "50000000");
		assert_eq!(message.fee, "1410");
		assert_eq!(message.status, TxStatus::Success);
		assert_eq!(message.height, "850000");
	}

	#[test]
	fn test_unspent_output_conversion() {
		let utxo: ExplorerUtxo = serde_json::from_str(
			r#"{"txid":"cd34","height":"849999","blockTime":"1717999999","address":"bc1qme","unspentAmount":"0.001","index":"3"}"#,
		)
		.unwrap();

		let output = unspent_output_from_explorer(&utxo).unwrap();
		assert_eq!(output.tx_id, "cd34");
		assert_eq!(output.tx_output_n, 3);
		assert_eq!(output.unspent_amount, "100000");
		assert_eq!(output.value_hex, "186a0");

		let broken = ExplorerUtxo {
			index: "x".to_string(),
			..utxo
		};
		assert!(unspent_output_from_explorer(&broken).is_err());
	}

	#[tokio::test]
	async fn test_balance_request() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/v5/explorer/address/address-summary"))
			.and(query_param("chainShortName", "BCH"))
			.and(query_param("address", "qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"))
			.and(header(ACCESS_KEY_HEADER, "secret"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"code": "0",
				"msg": "",
				"data": [{"address": "qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a", "balance": "0.25"}]
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = ExplorerClient::new("BCH", &node_with_explorer(&server.uri(), "secret"))
			.unwrap()
			.unwrap();
		let balance = client
			.balance("qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a")
			.await
			.unwrap();
		assert_eq!(balance, 25_000_000);
	}

	#[tokio::test]
	async fn test_explorer_error_code() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/v5/explorer/address/utxo"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"code": "50011",
				"msg": "Rate limit reached",
				"data": []
			})))
			.mount(&server)
			.await;

		let client = ExplorerClient::new("BTC", &node_with_explorer(&server.uri(), "secret"))
			.unwrap()
			.unwrap();
		let err = client.unspent_outputs("bc1qme").await.unwrap_err();
		assert!(
			matches!(err, AdaptorError::Explorer(ref msg) if msg == "address/utxo failed (50011): Rate limit reached")
		);
	}

	#[tokio::test]
	async fn test_explorer_http_failure() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(503))
			.mount(&server)
			.await;

		let client = ExplorerClient::new("BTC", &node_with_explorer(&server.uri(), "secret"))
			.unwrap()
			.unwrap();
		let err = client.transactions("bc1qme", 1, 20).await.unwrap_err();
		assert!(matches!(err, AdaptorError::Explorer(ref msg) if msg.contains("HTTP 503")));
	}

	#[tokio::test]
	async fn test_transaction_page_request() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/v5/explorer/address/transaction-list"))
			.and(query_param("page", "2"))
			.and(query_param("limit", "10"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"code": "0",
				"msg": "",
				"data": [{
					"page": "2",
					"limit": "10",
					"transactionLists": [
						{"txId": "ef56", "from": "bc1qa", "to": "bc1qb", "amount": "0.1", "txFee": "0.00001", "state": "pending"}
					]
				}]
			})))
			.mount(&server)
			.await;

		let client = ExplorerClient::new("BTC", &node_with_explorer(&server.uri(), "secret"))
			.unwrap()
			.unwrap();
		let txs = client.transactions("bc1qa", 2, 10).await.unwrap();
		assert_eq!(txs.len(), 1);
		assert_eq!(txs[0].hash, "ef56");
		assert_eq!(txs[0].status, TxStatus::Pending);
	}
}
