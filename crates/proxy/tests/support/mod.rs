//! Shared fixtures: stub collaborators on ephemeral ports and a hub wired to
//! them, driven over real HTTP.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, delete, get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use simhub_proxy::backend::{BackendSessionClient, BackendTimeouts};
use simhub_proxy::provisioner::ProvisioningClient;
use simhub_proxy::server;
use simhub_proxy::session::{SessionBroker, SessionRegistry};

/// Call counters and captures shared between a test and its stubs.
#[derive(Default)]
pub struct StubState {
	pub provision_hits: AtomicUsize,
	pub create_hits: AtomicUsize,
	pub forward_hits: AtomicUsize,
	pub delete_hits: AtomicUsize,
	pub last_create_body: std::sync::Mutex<Option<Value>>,
}

impl StubState {
	pub fn provision_count(&self) -> usize {
		self.provision_hits.load(Ordering::SeqCst)
	}

	pub fn create_count(&self) -> usize {
		self.create_hits.load(Ordering::SeqCst)
	}

	pub fn forward_count(&self) -> usize {
		self.forward_hits.load(Ordering::SeqCst)
	}

	pub fn delete_count(&self) -> usize {
		self.delete_hits.load(Ordering::SeqCst)
	}

	pub fn last_create_body(&self) -> Option<Value> {
		self.last_create_body.lock().unwrap().clone()
	}
}

async fn serve(router: Router) -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router.into_make_service()).await.unwrap();
	});
	format!("http://{addr}")
}

/// Base URL nothing is listening on; connections to it are refused.
pub async fn unreachable_base_url() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);
	format!("http://{addr}")
}

/// Provisioning stub answering `{udid: "U1", bundleId: "B1"}`.
pub async fn spawn_provisioner(state: Arc<StubState>) -> String {
	async fn simulate(State(state): State<Arc<StubState>>, Json(_body): Json<Value>) -> Json<Value> {
		state.provision_hits.fetch_add(1, Ordering::SeqCst);
		Json(json!({ "udid": "U1", "bundleId": "B1" }))
	}

	let router = Router::new().route("/api/simulate", post(simulate)).with_state(state);
	serve(router).await
}

/// Backend stub: healthy `/status`, creation answering `{sessionId: "S1"}`,
/// and command routes that echo enough to assert passthrough.
pub async fn spawn_backend(state: Arc<StubState>) -> String {
	async fn status() -> Json<Value> {
		Json(json!({ "value": { "ready": true } }))
	}

	async fn create(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Json<Value> {
		state.create_hits.fetch_add(1, Ordering::SeqCst);
		*state.last_create_body.lock().unwrap() = Some(body);
		Json(json!({ "sessionId": "S1", "value": { "capabilities": {} } }))
	}

	async fn remove(State(state): State<Arc<StubState>>, Path(session_id): Path<String>) -> Json<Value> {
		state.delete_hits.fetch_add(1, Ordering::SeqCst);
		Json(json!({ "value": null, "deleted": session_id }))
	}

	async fn command(
		State(state): State<Arc<StubState>>,
		Path((session_id, rest)): Path<(String, String)>,
		uri: Uri,
		body: Bytes,
	) -> Response {
		state.forward_hits.fetch_add(1, Ordering::SeqCst);
		match rest.as_str() {
			"element" => {
				let envelope = json!({
					"value": { "error": "no such element", "message": "unable to locate element" }
				});
				(StatusCode::NOT_FOUND, Json(envelope)).into_response()
			}
			_ => Json(json!({
				"value": null,
				"session": session_id,
				"path": uri.path(),
				"echo": String::from_utf8_lossy(&body)
			}))
			.into_response(),
		}
	}

	let router = Router::new()
		.route("/status", get(status))
		.route("/session", post(create))
		.route("/session/{session_id}", delete(remove))
		.route("/session/{session_id}/{*rest}", any(command))
		.with_state(state);
	serve(router).await
}

/// Backend stub whose creation endpoint answers `status_code` with a
/// protocol-style error body. `/status` still reports healthy.
pub async fn spawn_backend_failing_create(state: Arc<StubState>, status_code: u16) -> String {
	async fn status() -> Json<Value> {
		Json(json!({ "value": { "ready": true } }))
	}

	let router = Router::new()
		.route("/status", get(status))
		.route(
			"/session",
			post(move |State(state): State<Arc<StubState>>| async move {
				state.create_hits.fetch_add(1, Ordering::SeqCst);
				(
					StatusCode::from_u16(status_code).unwrap(),
					Json(json!({ "value": { "error": "session not created", "message": "stub refused" } })),
				)
			}),
		)
		.with_state(state);
	serve(router).await
}

/// Backend stub returning the session id only in the nested `value` shape.
pub async fn spawn_backend_nested_id(state: Arc<StubState>) -> String {
	async fn status() -> Json<Value> {
		Json(json!({ "value": { "ready": true } }))
	}

	async fn create(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Json<Value> {
		state.create_hits.fetch_add(1, Ordering::SeqCst);
		*state.last_create_body.lock().unwrap() = Some(body);
		Json(json!({ "value": { "sessionId": "S2", "capabilities": {} } }))
	}

	let router = Router::new().route("/status", get(status)).route("/session", post(create)).with_state(state);
	serve(router).await
}

/// Boots a hub wired to the given collaborator URLs; short bounds keep the
/// unreachable-collaborator tests fast.
pub async fn spawn_hub(provisioner_url: &str, backend_url: &str) -> (String, Arc<SessionRegistry>) {
	let provisioner_url: Url = provisioner_url.parse().unwrap();
	let backend_url: Url = backend_url.parse().unwrap();

	let provisioner = ProvisioningClient::new(&provisioner_url, Duration::from_secs(5)).unwrap();
	let backend = BackendSessionClient::new(
		&backend_url,
		BackendTimeouts {
			create: Duration::from_secs(5),
			command: Duration::from_secs(5),
			health: Duration::from_secs(2),
		},
	)
	.unwrap();

	let registry = Arc::new(SessionRegistry::new());
	let broker = Arc::new(SessionBroker::new(registry.clone(), provisioner, backend));
	(serve(server::router(broker)).await, registry)
}

/// The standard well-formed creation payload used across tests.
pub fn creation_payload() -> Value {
	json!({
		"capabilities": {
			"firstMatch": [{
				"appium:appId": "A1",
				"appium:deviceName": "iPhone 16 Pro Max",
				"appium:platformVersion": "18.5",
				"appium:wdaLaunchTimeout": 30000
			}]
		}
	})
}

/// Creates a session on `hub_url` and returns the backend-assigned id.
pub async fn create_session(client: &reqwest::Client, hub_url: &str) -> String {
	let response = client
		.post(format!("{hub_url}/wd/hub/session"))
		.json(&creation_payload())
		.send()
		.await
		.unwrap();
	assert_eq!(response.status(), 200, "session creation failed");
	let body: Value = response.json().await.unwrap();
	body["sessionId"].as_str().unwrap().to_string()
}
