use simhub_protocol::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HubError>;

/// Failures the hub owns, produced as typed variants at the point of failure
/// and classified into the protocol vocabulary exactly once.
#[derive(Debug, Error)]
pub enum HubError {
	#[error("invalid capabilities: {0}")]
	InvalidCapabilities(String),

	#[error("session {session_id} not found")]
	UnknownSession { session_id: String },

	#[error("{service} unavailable: {message}")]
	Unreachable { service: &'static str, message: String },

	#[error("{service} request timed out after {ms}ms")]
	Timeout { service: &'static str, ms: u64 },

	/// Backend answered session creation with a 4xx.
	#[error("backend rejected session creation ({status}): {body}")]
	BackendRejected { status: u16, body: String },

	/// Backend answered session creation with a 5xx.
	#[error("backend session creation failed ({status}): {body}")]
	BackendFailed { status: u16, body: String },

	#[error("provisioning failed ({status}): {body}")]
	ProvisionDenied { status: u16, body: String },

	#[error("{service} returned a malformed response: {message}")]
	MalformedResponse { service: &'static str, message: String },

	#[error("internal error: {0}")]
	Internal(String),
}

impl HubError {
	/// Protocol classification for this failure.
	pub fn classification(&self) -> ErrorCode {
		match self {
			HubError::InvalidCapabilities(_) | HubError::BackendRejected { .. } => ErrorCode::InvalidArgument,
			HubError::UnknownSession { .. } | HubError::Unreachable { .. } => ErrorCode::NoSuchSession,
			HubError::Timeout { .. } => ErrorCode::Timeout,
			HubError::BackendFailed { .. } | HubError::ProvisionDenied { .. } | HubError::MalformedResponse { .. } | HubError::Internal(_) => {
				ErrorCode::UnknownError
			}
		}
	}

	/// Classified envelope body for the wire.
	pub fn envelope(&self) -> ErrorEnvelope {
		ErrorEnvelope::new(self.classification(), self.to_string())
	}

	/// Envelope carrying a diagnostic trace, used on the creation path.
	pub fn envelope_with_trace(&self) -> ErrorEnvelope {
		self.envelope().with_stacktrace(format!("{self:?}"))
	}

	/// Maps a transport-level client failure against `service` into a typed
	/// variant. HTTP error statuses are not transport failures and must be
	/// handled by the caller before reaching here.
	pub fn from_transport(service: &'static str, bound_ms: u64, err: reqwest::Error) -> Self {
		if err.is_timeout() {
			HubError::Timeout { service, ms: bound_ms }
		} else if err.is_connect() {
			HubError::Unreachable {
				service,
				message: err.to_string(),
			}
		} else {
			HubError::MalformedResponse {
				service,
				message: err.to_string(),
			}
		}
	}
}
