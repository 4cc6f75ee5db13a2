//! Capability payload shapes for session creation.
//!
//! A new-session request arrives as a W3C-style capability object with a
//! `firstMatch` list. The hub extracts its three provisioning keys from the
//! first entry and treats every other key as opaque passthrough.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Vendor-prefixed key naming the stored application to install.
pub const CAP_APP_ID: &str = "appium:appId";
/// Vendor-prefixed key naming the requested device model.
pub const CAP_DEVICE_NAME: &str = "appium:deviceName";
/// Vendor-prefixed key naming the requested platform version.
pub const CAP_PLATFORM_VERSION: &str = "appium:platformVersion";

/// Vendor-prefixed key carrying the concrete device identifier.
pub const CAP_UDID: &str = "appium:udid";
/// Vendor-prefixed key carrying the installed application bundle id.
pub const CAP_BUNDLE_ID: &str = "appium:bundleId";
/// Standard key naming the target platform.
pub const CAP_PLATFORM_NAME: &str = "platformName";
/// Vendor-prefixed key naming the automation engine.
pub const CAP_AUTOMATION_NAME: &str = "appium:automationName";

/// Platform name the hub always pins in final capabilities.
pub const PLATFORM_NAME_IOS: &str = "IOS";
/// Automation engine the hub always pins in final capabilities.
pub const AUTOMATION_NAME_XCUITEST: &str = "XCUITest";

/// Session-creation request body: `{"capabilities": {"firstMatch": [...]}}`.
///
/// The same shape is used outbound when the hub sends the composed final
/// capability set to the backend driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionRequest {
	pub capabilities: CapabilityRequest,
}

/// W3C capability object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityRequest {
	/// Candidate capability sets; the hub negotiates against the first entry.
	#[serde(rename = "firstMatch", default)]
	pub first_match: Vec<Map<String, Value>>,
	/// Capabilities common to every candidate. Opaque to the hub.
	#[serde(rename = "alwaysMatch", default, skip_serializing_if = "Option::is_none")]
	pub always_match: Option<Map<String, Value>>,
}

impl NewSessionRequest {
	/// Wraps a single capability entry in the wire shape.
	pub fn single(entry: Map<String, Value>) -> Self {
		Self {
			capabilities: CapabilityRequest {
				first_match: vec![entry],
				always_match: None,
			},
		}
	}
}

/// Request body sent to the provisioning collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
	pub device_name: String,
	pub platform_version: String,
	pub app_id: String,
}

/// Concrete execution target the provisioning collaborator hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedTarget {
	/// Concrete device identifier.
	pub udid: String,
	/// Bundle id of the installed application.
	pub bundle_id: String,
}
