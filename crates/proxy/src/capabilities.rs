//! Capability negotiation.
//!
//! Splits an inbound capability payload into provisioning parameters and
//! opaque passthrough keys, and composes the final capability set the
//! backend driver receives once a concrete target exists.

use serde_json::{Map, Value};
use simhub_protocol::{
	AUTOMATION_NAME_XCUITEST, CAP_APP_ID, CAP_AUTOMATION_NAME, CAP_BUNDLE_ID, CAP_DEVICE_NAME, CAP_PLATFORM_NAME,
	CAP_PLATFORM_VERSION, CAP_UDID, NewSessionRequest, PLATFORM_NAME_IOS, ProvisionRequest, ProvisionedTarget,
};

use crate::error::{HubError, Result};

/// Outcome of negotiation: what the provisioner needs, and every other
/// capability key untouched.
#[derive(Debug, Clone)]
pub struct NegotiatedCapabilities {
	pub provision: ProvisionRequest,
	pub passthrough: Map<String, Value>,
}

/// Validates `request` and extracts the three provisioning keys from its
/// first `firstMatch` entry. Pure: the input is never mutated, and the
/// passthrough map is a copy with the extracted keys removed.
pub fn negotiate(request: &NewSessionRequest) -> Result<NegotiatedCapabilities> {
	let Some(entry) = request.capabilities.first_match.first() else {
		return Err(HubError::InvalidCapabilities(
			"capabilities.firstMatch must contain at least one entry".into(),
		));
	};

	let app_id = required_string(entry, CAP_APP_ID)?;
	let device_name = required_string(entry, CAP_DEVICE_NAME)?;
	let platform_version = required_string(entry, CAP_PLATFORM_VERSION)?;

	let mut passthrough = entry.clone();
	passthrough.remove(CAP_APP_ID);
	passthrough.remove(CAP_DEVICE_NAME);
	passthrough.remove(CAP_PLATFORM_VERSION);

	Ok(NegotiatedCapabilities {
		provision: ProvisionRequest {
			device_name,
			platform_version,
			app_id,
		},
		passthrough,
	})
}

fn required_string(entry: &Map<String, Value>, key: &str) -> Result<String> {
	entry
		.get(key)
		.and_then(Value::as_str)
		.filter(|value| !value.is_empty())
		.map(str::to_owned)
		.ok_or_else(|| HubError::InvalidCapabilities(format!("missing required capability: {key}")))
}

impl NegotiatedCapabilities {
	/// Composes the capability set sent to the backend: passthrough keys,
	/// the pinned platform/automation pair, the retained device and platform
	/// version, and the provisioned identifiers.
	pub fn finalize(&self, target: &ProvisionedTarget) -> NewSessionRequest {
		let mut entry = self.passthrough.clone();
		entry.insert(CAP_PLATFORM_NAME.to_string(), Value::String(PLATFORM_NAME_IOS.to_string()));
		entry.insert(CAP_AUTOMATION_NAME.to_string(), Value::String(AUTOMATION_NAME_XCUITEST.to_string()));
		entry.insert(CAP_DEVICE_NAME.to_string(), Value::String(self.provision.device_name.clone()));
		entry.insert(CAP_PLATFORM_VERSION.to_string(), Value::String(self.provision.platform_version.clone()));
		entry.insert(CAP_UDID.to_string(), Value::String(target.udid.clone()));
		entry.insert(CAP_BUNDLE_ID.to_string(), Value::String(target.bundle_id.clone()));
		NewSessionRequest::single(entry)
	}
}
