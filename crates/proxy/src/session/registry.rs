//! Concurrent session registry.
//!
//! The registry is the sole source of truth for which backend serves which
//! session. Records are immutable after insertion; every lookup returns a
//! copy, so no caller holds a reference into the map across a network call.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Current Unix timestamp in seconds.
pub fn now_ts() -> u64 {
	std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Live session metadata, created once the backend confirms the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
	/// Backend-assigned session identifier.
	pub session_id: String,
	/// Base address of the backend serving this session.
	pub backend_url: String,
	/// Concrete device identifier the session runs on.
	pub udid: String,
	/// Bundle id of the application under automation.
	pub bundle_id: String,
	/// Unix epoch seconds when the session was registered.
	pub created_at: u64,
}

/// Injected, explicitly owned map from session id to [`SessionRecord`].
///
/// Entry operations are atomic under the inner lock; the lock is never held
/// across an await point outside this module.
#[derive(Default)]
pub struct SessionRegistry {
	sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces the record under its session id.
	pub async fn put(&self, record: SessionRecord) {
		let mut sessions = self.sessions.lock().await;
		sessions.insert(record.session_id.clone(), record);
	}

	/// Returns a copy of the record for `session_id` when present.
	pub async fn get(&self, session_id: &str) -> Option<SessionRecord> {
		self.sessions.lock().await.get(session_id).cloned()
	}

	/// Removes and returns the record for `session_id`.
	pub async fn remove(&self, session_id: &str) -> Option<SessionRecord> {
		self.sessions.lock().await.remove(session_id)
	}

	/// Snapshot of every live record.
	pub async fn list_all(&self) -> Vec<SessionRecord> {
		self.sessions.lock().await.values().cloned().collect()
	}

	/// Removes every record strictly older than `max_age`, returning the
	/// removed ids. A record whose age equals `max_age` exactly survives.
	pub async fn reap(&self, max_age: Duration) -> Vec<String> {
		self.reap_before(now_ts().saturating_sub(max_age.as_secs())).await
	}

	/// Removes every record created strictly before `cutoff`.
	pub async fn reap_before(&self, cutoff: u64) -> Vec<String> {
		let mut sessions = self.sessions.lock().await;
		let expired: Vec<String> = sessions
			.values()
			.filter(|record| record.created_at < cutoff)
			.map(|record| record.session_id.clone())
			.collect();
		for session_id in &expired {
			debug!(target = "simhub.session", session_id = %session_id, "reaping expired session");
			sessions.remove(session_id);
		}
		expired
	}
}
