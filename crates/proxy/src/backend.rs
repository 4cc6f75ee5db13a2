//! Client for the backend automation driver.
//!
//! Session creation and deletion are operations the hub owns, with failures
//! classified here at the point of failure. Command forwarding is a
//! passthrough: backend error responses are data, not failures, and only
//! transport-level problems are classified.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde_json::Value;
use simhub_protocol::NewSessionRequest;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{HubError, Result};

const SERVICE: &str = "backend";

/// Routing prefix the hub exposes externally but strips before the backend.
pub const HUB_PREFIX: &str = "/wd/hub";

/// Timeout bounds applied to backend calls.
#[derive(Debug, Clone, Copy)]
pub struct BackendTimeouts {
	/// Bound for session creation.
	pub create: Duration,
	/// Bound for forwarded commands and deletion.
	pub command: Duration,
	/// Bound for the pre-creation health probe.
	pub health: Duration,
}

impl Default for BackendTimeouts {
	fn default() -> Self {
		Self {
			create: Duration::from_secs(30),
			command: Duration::from_secs(30),
			health: Duration::from_secs(5),
		}
	}
}

/// Session successfully opened on the backend.
#[derive(Debug, Clone)]
pub struct CreatedSession {
	/// Identifier the backend assigned.
	pub session_id: String,
	/// The backend's raw creation body, returned to the client verbatim.
	pub body: Value,
}

/// Backend response to a forwarded command, passed through unmodified.
#[derive(Debug)]
pub struct ForwardedResponse {
	pub status: u16,
	pub headers: HeaderMap,
	pub body: Bytes,
}

pub struct BackendSessionClient {
	base_url: String,
	timeouts: BackendTimeouts,
	client: reqwest::Client,
}

impl BackendSessionClient {
	pub fn new(base_url: &Url, timeouts: BackendTimeouts) -> Result<Self> {
		let client = reqwest::Client::builder()
			.build()
			.map_err(|e| HubError::Internal(format!("failed to create HTTP client: {e}")))?;
		Ok(Self {
			base_url: base_url.as_str().trim_end_matches('/').to_string(),
			timeouts,
			client,
		})
	}

	/// Base address new sessions are opened against.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Probes the backend's `/status` endpoint.
	///
	/// Run before session creation so an unreachable backend surfaces as a
	/// typed failure instead of an opaque creation error.
	pub async fn check_health(&self) -> Result<()> {
		let url = format!("{}/status", self.base_url);
		let response = self
			.client
			.get(&url)
			.timeout(self.timeouts.health)
			.send()
			.await
			.map_err(|e| HubError::from_transport(SERVICE, self.timeouts.health.as_millis() as u64, e))?;

		if !response.status().is_success() {
			return Err(HubError::Unreachable {
				service: SERVICE,
				message: format!("status endpoint answered {}", response.status()),
			});
		}
		Ok(())
	}

	/// Opens a session with the composed final capabilities.
	pub async fn create_session(&self, capabilities: &NewSessionRequest) -> Result<CreatedSession> {
		let url = format!("{}/session", self.base_url);
		debug!(target = "simhub.backend", %url, "creating backend session");

		let response = self
			.client
			.post(&url)
			.json(capabilities)
			.timeout(self.timeouts.create)
			.send()
			.await
			.map_err(|e| HubError::from_transport(SERVICE, self.timeouts.create.as_millis() as u64, e))?;

		let status = response.status();
		let body = response.text().await.map_err(|e| HubError::MalformedResponse {
			service: SERVICE,
			message: e.to_string(),
		})?;

		if status.is_client_error() {
			return Err(HubError::BackendRejected {
				status: status.as_u16(),
				body,
			});
		}
		if !status.is_success() {
			return Err(HubError::BackendFailed {
				status: status.as_u16(),
				body,
			});
		}

		let body: Value = serde_json::from_str(&body).map_err(|e| HubError::MalformedResponse {
			service: SERVICE,
			message: format!("session creation body is not JSON: {e}"),
		})?;
		let session_id = extract_session_id(&body).ok_or_else(|| HubError::MalformedResponse {
			service: SERVICE,
			message: "session creation response did not contain a session id".into(),
		})?;

		info!(target = "simhub.backend", session_id = %session_id, "backend session created");
		Ok(CreatedSession { session_id, body })
	}

	/// Deletes `session_id` on the backend serving it. Best-effort: callers
	/// treat failures as advisory and drop the registry entry regardless.
	pub async fn delete_session(&self, backend_url: &str, session_id: &str) -> Result<()> {
		let url = format!("{backend_url}/session/{session_id}");
		debug!(target = "simhub.backend", %url, "deleting backend session");

		let response = self
			.client
			.delete(&url)
			.timeout(self.timeouts.command)
			.send()
			.await
			.map_err(|e| HubError::from_transport(SERVICE, self.timeouts.command.as_millis() as u64, e))?;

		if !response.status().is_success() {
			warn!(
				target = "simhub.backend",
				session_id,
				status = %response.status(),
				"backend answered non-2xx on session deletion"
			);
		}
		Ok(())
	}

	/// Forwards one hub-prefixed command and returns the backend's response
	/// unmodified.
	pub async fn forward(&self, backend_url: &str, method: &str, hub_path: &str, body: Bytes) -> Result<ForwardedResponse> {
		let url = format!("{}{}", backend_url, backend_path(hub_path));
		let method = reqwest::Method::from_bytes(method.as_bytes())
			.map_err(|_| HubError::Internal(format!("unsupported method: {method}")))?;
		debug!(target = "simhub.backend", %url, method = %method, "forwarding command");

		let mut request = self.client.request(method, &url).timeout(self.timeouts.command);
		if !body.is_empty() {
			request = request.header(reqwest::header::CONTENT_TYPE, "application/json").body(body);
		}

		let response = request
			.send()
			.await
			.map_err(|e| HubError::from_transport(SERVICE, self.timeouts.command.as_millis() as u64, e))?;

		let status = response.status().as_u16();
		let headers = response.headers().clone();
		let body = response.bytes().await.map_err(|e| HubError::MalformedResponse {
			service: SERVICE,
			message: e.to_string(),
		})?;

		Ok(ForwardedResponse { status, headers, body })
	}
}

/// Rewrites a hub-prefixed path to the backend's native path: the prefix is
/// stripped, the session id segment and any trailing command segments stay
/// verbatim.
fn backend_path(hub_path: &str) -> &str {
	hub_path.strip_prefix(HUB_PREFIX).unwrap_or(hub_path)
}

/// Session id from either creation response shape: top-level `sessionId` or
/// nested `value.sessionId`.
fn extract_session_id(body: &Value) -> Option<String> {
	body.get("sessionId")
		.and_then(Value::as_str)
		.or_else(|| body.get("value").and_then(|v| v.get("sessionId")).and_then(Value::as_str))
		.map(str::to_owned)
}
