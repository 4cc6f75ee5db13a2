//! Session orchestration: the create/forward/delete workflow.

use std::sync::Arc;

use axum::body::Bytes;
use serde_json::Value;
use simhub_protocol::NewSessionRequest;
use tracing::{debug, info, warn};

use super::registry::{SessionRecord, SessionRegistry, now_ts};
use crate::backend::{BackendSessionClient, ForwardedResponse};
use crate::capabilities;
use crate::error::{HubError, Result};
use crate::provisioner::ProvisioningClient;

/// Composes negotiation, provisioning, backend creation, and registration.
///
/// Creation walks validate → provision → open → register; each step fails
/// with its own classification and nothing is retried. A failure before the
/// backend confirms leaves no registry entry behind.
pub struct SessionBroker {
	registry: Arc<SessionRegistry>,
	provisioner: ProvisioningClient,
	backend: BackendSessionClient,
}

impl SessionBroker {
	pub fn new(registry: Arc<SessionRegistry>, provisioner: ProvisioningClient, backend: BackendSessionClient) -> Self {
		Self {
			registry,
			provisioner,
			backend,
		}
	}

	/// Registry handle shared with the introspection surface.
	pub fn registry(&self) -> &Arc<SessionRegistry> {
		&self.registry
	}

	/// Runs the full creation flow and returns the backend's raw creation
	/// body for verbatim passthrough.
	pub async fn create_session(&self, request: NewSessionRequest) -> Result<Value> {
		let negotiated = capabilities::negotiate(&request)?;
		debug!(
			target = "simhub.session",
			device = %negotiated.provision.device_name,
			platform = %negotiated.provision.platform_version,
			app_id = %negotiated.provision.app_id,
			"capabilities validated"
		);

		// No lock is held here; provisioning can take minutes.
		let target = self.provisioner.provision(&negotiated.provision).await?;

		self.backend.check_health().await?;
		let final_caps = negotiated.finalize(&target);
		let created = self.backend.create_session(&final_caps).await?;

		self.registry
			.put(SessionRecord {
				session_id: created.session_id.clone(),
				backend_url: self.backend.base_url().to_string(),
				udid: target.udid,
				bundle_id: target.bundle_id,
				created_at: now_ts(),
			})
			.await;

		info!(target = "simhub.session", session_id = %created.session_id, "session registered");
		Ok(created.body)
	}

	/// Looks up the owning backend and forwards one command verbatim. An
	/// unknown session id fails before any network call.
	pub async fn forward(&self, session_id: &str, method: &str, hub_path: &str, body: Bytes) -> Result<ForwardedResponse> {
		let record = self.registry.get(session_id).await.ok_or_else(|| HubError::UnknownSession {
			session_id: session_id.to_string(),
		})?;
		self.backend.forward(&record.backend_url, method, hub_path, body).await
	}

	/// Removes the session from the registry, then deletes it on the backend
	/// best-effort.
	pub async fn delete_session(&self, session_id: &str) -> Result<()> {
		let record = self.registry.remove(session_id).await.ok_or_else(|| HubError::UnknownSession {
			session_id: session_id.to_string(),
		})?;

		if let Err(err) = self.backend.delete_session(&record.backend_url, session_id).await {
			warn!(
				target = "simhub.session",
				session_id,
				error = %err,
				"backend deletion failed; registry entry already removed"
			);
		}

		info!(target = "simhub.session", session_id, "session deleted");
		Ok(())
	}
}
