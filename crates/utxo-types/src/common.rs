//! Reply status shared by every operation.

use serde::{Deserialize, Serialize};

/// Status code carried in every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnCode {
	#[default]
	Success,
	Error,
}

/// Uniform view over the `code`/`msg` pair of every response type.
pub trait Reply: Default {
	fn code(&self) -> ReturnCode;

	fn msg(&self) -> &str;

	/// Builds an error-class reply with an empty payload.
	fn failure(msg: impl Into<String>) -> Self;

	fn is_success(&self) -> bool {
		self.code() == ReturnCode::Success
	}
}

/// Serde adapter for `Vec<u8>` fields encoded as hex strings.
///
/// A leading `0x` is accepted when decoding.
pub mod hex_bytes {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&hex::encode(bytes))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		decode(&s).map_err(serde::de::Error::custom)
	}

	pub(crate) fn decode(s: &str) -> Result<Vec<u8>, String> {
		let trimmed = s.strip_prefix("0x").unwrap_or(s);
		hex::decode(trimmed).map_err(|e| format!("Invalid hex string '{}': {}", s, e))
	}
}

/// Serde adapter for `Vec<Vec<u8>>` fields encoded as lists of hex strings.
pub mod hex_bytes_list {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_seq(items.iter().map(hex::encode))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let items = Vec::<String>::deserialize(deserializer)?;
		items
			.iter()
			.map(|s| super::hex_bytes::decode(s))
			.collect::<Result<_, _>>()
			.map_err(serde::de::Error::custom)
	}
}
