//! API module for the ledger server

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub credential_count: usize,
    pub prescription_count: usize,
    pub signer_count: usize,
    pub threshold: usize,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        service: state.config.service_name.clone(),
        credential_count: state.ledger.credential_count(),
        prescription_count: state.ledger.prescription_count(),
        signer_count: state.ledger.signer_count(),
        threshold: state.ledger.threshold(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration for browser-based clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Credential endpoints
        .route("/v1/credentials", post(handlers::issue_credential))
        .route("/v1/credentials/{id}/revoke", post(handlers::revoke_credential))
        .route(
            "/v1/credentials/{id}/reactivate",
            post(handlers::reactivate_credential),
        )
        .route("/v1/credentials/{id}/valid", get(handlers::credential_valid))
        // Prescription endpoints
        .route("/v1/prescriptions", post(handlers::create_prescription))
        .route("/v1/prescriptions/status", post(handlers::batch_status))
        .route(
            "/v1/prescriptions/{id}/dispense",
            post(handlers::dispense_prescription),
        )
        .route(
            "/v1/prescriptions/{id}/cancel",
            post(handlers::cancel_prescription),
        )
        .route(
            "/v1/prescriptions/{id}/details",
            post(handlers::prescription_details),
        )
        .route(
            "/v1/prescriptions/{id}/dispensable",
            get(handlers::prescription_dispensable),
        )
        // Governance endpoints
        .route("/v1/governance/actions", post(handlers::propose_action))
        .route(
            "/v1/governance/actions/{nonce}/approve",
            post(handlers::approve_action),
        )
        .route(
            "/v1/governance/actions/{nonce}/execute",
            post(handlers::execute_action),
        )
        .route("/v1/governance/signers", get(handlers::list_signers))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
