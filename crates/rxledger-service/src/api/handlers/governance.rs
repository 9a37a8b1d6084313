//! Governance handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use rxledger_core::{ActionNonce, AdminActionKind, Identity};

use crate::api::error::ApiError;
use crate::ledger::ExecutionOutcome;

use super::{caller_identity, AppState};

/// Request to propose a privileged action
#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    /// What executing the action will do
    pub kind: AdminActionKind,

    /// Action payload as JSON (a signer identity, or an audit-trail request)
    pub payload: serde_json::Value,
}

/// Response from proposing an action
#[derive(Debug, Serialize)]
pub struct ProposeResponse {
    pub nonce: ActionNonce,
    pub approvals: usize,
}

/// Response from approving an action
#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub nonce: ActionNonce,
    pub approvals: usize,
}

/// Response from executing an action
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub nonce: ActionNonce,
    pub outcome: ExecutionOutcome,
}

/// Current signer set and threshold
#[derive(Debug, Serialize)]
pub struct SignersResponse {
    pub signers: Vec<Identity>,
    pub threshold: usize,
}

/// Propose a privileged action
///
/// POST /v1/governance/actions
pub async fn propose_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ProposeRequest>,
) -> Result<Json<ProposeResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    let payload = serde_json::to_vec(&request.payload)
        .map_err(|e| ApiError::BadRequest(format!("Unencodable payload: {}", e)))?;

    let nonce = state.ledger.propose(&caller, request.kind, payload)?;

    info!(nonce, kind = %request.kind, "Action proposed via API");
    Ok(Json(ProposeResponse {
        nonce,
        approvals: 1,
    }))
}

/// Approve a pending action
///
/// POST /v1/governance/actions/{nonce}/approve
pub async fn approve_action(
    State(state): State<Arc<AppState>>,
    Path(nonce): Path<ActionNonce>,
    headers: HeaderMap,
) -> Result<Json<ApproveResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    let approvals = state.ledger.approve(&caller, nonce)?;

    Ok(Json(ApproveResponse { nonce, approvals }))
}

/// Execute an action once its approvals reach the threshold
///
/// POST /v1/governance/actions/{nonce}/execute
pub async fn execute_action(
    State(state): State<Arc<AppState>>,
    Path(nonce): Path<ActionNonce>,
    headers: HeaderMap,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    let outcome = state.ledger.execute(&caller, nonce)?;

    Ok(Json(ExecuteResponse { nonce, outcome }))
}

/// Current signer set and threshold
///
/// GET /v1/governance/signers
pub async fn list_signers(State(state): State<Arc<AppState>>) -> Json<SignersResponse> {
    Json(SignersResponse {
        signers: state.ledger.signers(),
        threshold: state.ledger.threshold(),
    })
}
