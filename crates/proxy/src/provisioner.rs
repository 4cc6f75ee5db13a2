//! Client for the external provisioning collaborator.
//!
//! The collaborator turns abstract device/app parameters into a booted
//! simulator with the application installed. The hub only sees the
//! request/response boundary.

use std::time::Duration;

use simhub_protocol::{ProvisionRequest, ProvisionedTarget};
use tracing::{debug, info};
use url::Url;

use crate::error::{HubError, Result};

const SERVICE: &str = "provisioner";

pub struct ProvisioningClient {
	base_url: String,
	timeout: Duration,
	client: reqwest::Client,
}

impl ProvisioningClient {
	/// Builds a client for the collaborator at `base_url`. The bound is
	/// deliberately long; provisioning legitimately takes minutes.
	pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
		let client = reqwest::Client::builder()
			.build()
			.map_err(|e| HubError::Internal(format!("failed to create HTTP client: {e}")))?;
		Ok(Self {
			base_url: base_url.as_str().trim_end_matches('/').to_string(),
			timeout,
			client,
		})
	}

	/// Asks the collaborator for a concrete execution target.
	pub async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionedTarget> {
		let url = format!("{}/api/simulate", self.base_url);
		debug!(
			target = "simhub.provision",
			%url,
			device = %request.device_name,
			platform = %request.platform_version,
			app_id = %request.app_id,
			"requesting provisioned target"
		);

		let response = self
			.client
			.post(&url)
			.json(request)
			.timeout(self.timeout)
			.send()
			.await
			.map_err(|e| HubError::from_transport(SERVICE, self.timeout.as_millis() as u64, e))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(HubError::ProvisionDenied {
				status: status.as_u16(),
				body,
			});
		}

		let target: ProvisionedTarget = response.json().await.map_err(|e| HubError::MalformedResponse {
			service: SERVICE,
			message: e.to_string(),
		})?;

		info!(
			target = "simhub.provision",
			udid = %target.udid,
			bundle_id = %target.bundle_id,
			"target provisioned"
		);
		Ok(target)
	}
}
