//! HTTP surface: hub-prefixed protocol routes plus debug introspection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::HeaderName;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use simhub_protocol::{ErrorCode, ErrorEnvelope, NewSessionRequest};
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;

use crate::backend::{BackendSessionClient, BackendTimeouts, ForwardedResponse};
use crate::cli::Cli;
use crate::error::HubError;
use crate::provisioner::ProvisioningClient;
use crate::session::registry::now_ts;
use crate::session::{SessionBroker, SessionRegistry};

type SharedBroker = Arc<SessionBroker>;

/// Builds the hub router over an assembled broker.
pub fn router(broker: SharedBroker) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/sessions", get(list_sessions))
		.route("/sessions/{session_id}", get(session_info))
		.route("/wd/hub/session", post(create_session).fallback(route_not_found))
		.route("/wd/hub/session/{session_id}", delete(delete_session).fallback(route_not_found))
		.route("/wd/hub/session/{session_id}/{*rest}", any(forward_command))
		.fallback(route_not_found)
		.with_state(broker)
}

/// Assembles the collaborator clients and serves the hub until shutdown.
pub async fn run(cli: Cli) -> Result<()> {
	let provisioner_url: Url = cli
		.provisioner_url
		.parse()
		.with_context(|| format!("invalid provisioner URL: {}", cli.provisioner_url))?;
	let backend_url: Url = cli
		.backend_url
		.parse()
		.with_context(|| format!("invalid backend URL: {}", cli.backend_url))?;

	let provisioner = ProvisioningClient::new(&provisioner_url, Duration::from_secs(cli.provision_timeout_secs))?;
	let backend = BackendSessionClient::new(
		&backend_url,
		BackendTimeouts {
			create: Duration::from_secs(cli.create_timeout_secs),
			command: Duration::from_secs(cli.command_timeout_secs),
			health: Duration::from_secs(cli.health_timeout_secs),
		},
	)?;

	let registry = Arc::new(SessionRegistry::new());
	let broker = Arc::new(SessionBroker::new(registry.clone(), provisioner, backend));

	if let Some(interval) = cli.reap_interval_secs {
		spawn_reaper(
			registry,
			Duration::from_secs(interval),
			Duration::from_secs(cli.session_max_age_hours * 3600),
		);
	}

	let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
		.parse()
		.with_context(|| format!("invalid host/port combination: {}:{}", cli.host, cli.port))?;

	info!(
		target = "simhub.server",
		%addr,
		provisioner = %provisioner_url,
		backend = %backend_url,
		"starting hub proxy"
	);

	let listener = TcpListener::bind(addr)
		.await
		.with_context(|| format!("failed to bind hub proxy to {addr}"))?;

	axum::serve(listener, router(broker).into_make_service())
		.await
		.context("hub proxy server error")
}

/// Detached periodic sweep removing sessions past the configured age.
fn spawn_reaper(registry: Arc<SessionRegistry>, interval: Duration, max_age: Duration) {
	info!(
		target = "simhub.server",
		interval_secs = interval.as_secs(),
		max_age_secs = max_age.as_secs(),
		"session reaper enabled"
	);
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			let reaped = registry.reap(max_age).await;
			if !reaped.is_empty() {
				info!(target = "simhub.server", count = reaped.len(), "reaped expired sessions");
			}
		}
	});
}

async fn health() -> Json<serde_json::Value> {
	Json(json!({
		"status": "healthy",
		"service": "simhub-proxy",
		"timestamp": now_ts()
	}))
}

async fn list_sessions(State(broker): State<SharedBroker>) -> Json<serde_json::Value> {
	let sessions = broker.registry().list_all().await;
	Json(json!({ "sessions": sessions }))
}

async fn session_info(State(broker): State<SharedBroker>, Path(session_id): Path<String>) -> Response {
	match broker.registry().get(&session_id).await {
		Some(record) => Json(record).into_response(),
		None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Session not found" }))).into_response(),
	}
}

async fn create_session(State(broker): State<SharedBroker>, body: Bytes) -> Response {
	let request: NewSessionRequest = match serde_json::from_slice(&body) {
		Ok(request) => request,
		Err(err) => {
			let err = HubError::InvalidCapabilities(format!("malformed session request: {err}"));
			return classified_with_trace(&err);
		}
	};

	match broker.create_session(request).await {
		Ok(body) => Json(body).into_response(),
		Err(err) => {
			warn!(target = "simhub.server", error = %err, "session creation failed");
			classified_with_trace(&err)
		}
	}
}

async fn delete_session(State(broker): State<SharedBroker>, Path(session_id): Path<String>) -> Response {
	match broker.delete_session(&session_id).await {
		Ok(()) => Json(json!({ "success": true })).into_response(),
		Err(err) => {
			warn!(target = "simhub.server", session_id = %session_id, error = %err, "session deletion failed");
			classified(&err)
		}
	}
}

async fn forward_command(
	State(broker): State<SharedBroker>,
	Path((session_id, _rest)): Path<(String, String)>,
	method: Method,
	uri: Uri,
	body: Bytes,
) -> Response {
	let hub_path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());

	match broker.forward(&session_id, method.as_str(), hub_path, body).await {
		Ok(forwarded) => passthrough_response(forwarded),
		Err(err) => {
			warn!(target = "simhub.server", session_id = %session_id, error = %err, "command forwarding failed");
			classified(&err)
		}
	}
}

async fn route_not_found(method: Method, uri: Uri) -> Response {
	let envelope = ErrorEnvelope::new(ErrorCode::NoSuchElement, format!("Route not found: {method} {uri}"));
	(StatusCode::NOT_FOUND, Json(envelope)).into_response()
}

/// Classified errors always travel as HTTP 500 with the protocol code in the
/// body, mirroring the status-in-body convention.
fn classified(err: &HubError) -> Response {
	(StatusCode::INTERNAL_SERVER_ERROR, Json(err.envelope())).into_response()
}

fn classified_with_trace(err: &HubError) -> Response {
	(StatusCode::INTERNAL_SERVER_ERROR, Json(err.envelope_with_trace())).into_response()
}

/// Rebuilds the backend's response without reinterpreting it. Hop-by-hop
/// headers are dropped; the framing headers are recomputed for the new body.
fn passthrough_response(forwarded: ForwardedResponse) -> Response {
	let mut response = Response::new(Body::from(forwarded.body));
	*response.status_mut() = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
	let headers = response.headers_mut();
	for (name, value) in &forwarded.headers {
		if is_end_to_end(name) {
			headers.append(name.clone(), value.clone());
		}
	}
	response
}

fn is_end_to_end(name: &HeaderName) -> bool {
	!matches!(
		name.as_str(),
		"connection" | "keep-alive" | "proxy-authenticate" | "proxy-authorization" | "te" | "trailer" | "transfer-encoding" | "upgrade" | "content-length"
	)
}
