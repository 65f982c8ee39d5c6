//! Transport-level call status.
//!
//! A `Status` is what a call returns when it fails outside the normal reply
//! channel: a delegate error surfaced by an adaptor, or a recovered panic.
//! Anticipated failures such as an unregistered chain are ordinary replies
//! and never become a `Status`.

use crate::errors::AdaptorError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
	Unknown,
	InvalidArgument,
	Internal,
	Unavailable,
}

impl fmt::Display for Code {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Code::Unknown => "Unknown",
			Code::InvalidArgument => "InvalidArgument",
			Code::Internal => "Internal",
			Code::Unavailable => "Unavailable",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
	pub code: Code,
	pub message: String,
}

impl Status {
	pub fn new(code: Code, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	pub fn internal(message: impl Into<String>) -> Self {
		Self::new(Code::Internal, message)
	}

	pub fn unknown(message: impl Into<String>) -> Self {
		Self::new(Code::Unknown, message)
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "status {}: {}", self.code, self.message)
	}
}

impl std::error::Error for Status {}

impl From<AdaptorError> for Status {
	fn from(error: AdaptorError) -> Self {
		match &error {
			AdaptorError::InvalidRequest(_) => Status::new(Code::InvalidArgument, error.to_string()),
			AdaptorError::Rpc(_) | AdaptorError::Explorer(_) => {
				Status::new(Code::Unavailable, error.to_string())
			}
			AdaptorError::Config(_) | AdaptorError::Other(_) => Status::unknown(error.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_adaptor_error_mapping() {
		let status: Status = AdaptorError::Rpc("connection refused".to_string()).into();
		assert_eq!(status.code, Code::Unavailable);
		assert_eq!(status.message, "RPC error: connection refused");

		let status: Status = AdaptorError::Explorer("address/utxo returned HTTP 502".to_string()).into();
		assert_eq!(status.code, Code::Unavailable);

		let status: Status = AdaptorError::InvalidRequest("bad hash".to_string()).into();
		assert_eq!(status.code, Code::InvalidArgument);

		let status: Status = AdaptorError::Config("no node section".to_string()).into();
		assert_eq!(status, Status::unknown("Configuration error: no node section"));

		let status: Status = AdaptorError::Other(anyhow::anyhow!("boom")).into();
		assert_eq!(status.code, Code::Unknown);
		assert_eq!(status.message, "boom");
	}

	#[test]
	fn test_status_wire_shape() {
		let json = serde_json::to_value(Status::internal("Panic err: boom")).unwrap();
		assert_eq!(json["code"], "INTERNAL");
		assert_eq!(json["message"], "Panic err: boom");
	}
}
