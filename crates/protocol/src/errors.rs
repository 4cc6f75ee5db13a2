//! Protocol error vocabulary and the classified error envelope.
//!
//! The hub reports its own failures with the legacy JSON-wire convention:
//! HTTP 500 with the numeric classification in the body's `status` field.

use serde::{Deserialize, Serialize};

/// Numeric protocol error classifications the hub emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
	/// Session id unknown, or a collaborator is unreachable.
	NoSuchSession,
	/// Reserved for unmatched routes.
	NoSuchElement,
	/// Catch-all for unclassified failures.
	UnknownError,
	/// A bounded wait elapsed.
	Timeout,
	/// Malformed or incomplete request payload.
	InvalidArgument,
}

impl ErrorCode {
	/// Numeric `status` value carried in the envelope body.
	pub fn code(self) -> u16 {
		match self {
			ErrorCode::NoSuchSession => 6,
			ErrorCode::NoSuchElement => 7,
			ErrorCode::UnknownError => 13,
			ErrorCode::Timeout => 21,
			ErrorCode::InvalidArgument => 400,
		}
	}

	/// Canonical protocol error string.
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::NoSuchSession => "no such session",
			ErrorCode::NoSuchElement => "no such element",
			ErrorCode::UnknownError => "unknown error",
			ErrorCode::Timeout => "timeout",
			ErrorCode::InvalidArgument => "invalid argument",
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inner `value` object of the classified envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorValue {
	pub error: String,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stacktrace: Option<String>,
}

/// Classified error body: `{"status": <int>, "value": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
	pub status: u16,
	pub value: ErrorValue,
}

impl ErrorEnvelope {
	/// Builds an envelope for `code` with a human-readable message.
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			status: code.code(),
			value: ErrorValue {
				error: code.as_str().to_string(),
				message: message.into(),
				stacktrace: None,
			},
		}
	}

	/// Attaches a stacktrace-style diagnostic string.
	pub fn with_stacktrace(mut self, trace: impl Into<String>) -> Self {
		self.value.stacktrace = Some(trace.into());
		self
	}
}
