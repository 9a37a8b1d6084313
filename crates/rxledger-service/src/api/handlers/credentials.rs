//! Credential registry handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

use rxledger_core::{Commitment, CredentialId, CredentialKind, Identity};

use crate::api::error::ApiError;

use super::{caller_identity, AppState};

/// Request to issue a credential
#[derive(Debug, Deserialize)]
pub struct IssueCredentialRequest {
    /// Identity the credential is bound to
    pub holder: Identity,

    /// Role the credential authorizes
    pub kind: CredentialKind,

    /// Hex-encoded commitment to the license document
    pub license_commitment: String,

    /// Free-text specialty
    pub specialty: String,

    /// Opaque pointer to off-ledger credential metadata
    pub metadata_ref: String,

    /// Validity window in days
    pub validity_days: i64,
}

/// Response from credential issuance
#[derive(Debug, Serialize)]
pub struct IssueCredentialResponse {
    pub credential_id: CredentialId,
}

/// Credential state after an issuer mutation
#[derive(Debug, Serialize)]
pub struct CredentialStateResponse {
    pub credential_id: CredentialId,
    pub active: bool,
}

/// Validity predicate response
#[derive(Debug, Serialize)]
pub struct CredentialValidResponse {
    pub credential_id: CredentialId,
    pub valid: bool,
}

/// Issue a credential
///
/// POST /v1/credentials
pub async fn issue_credential(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<IssueCredentialRequest>,
) -> Result<Json<IssueCredentialResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    let license_commitment = Commitment::from_hex(&request.license_commitment)?;

    let credential_id = state.ledger.issue_credential(
        &caller,
        request.holder,
        request.kind,
        license_commitment,
        request.specialty,
        request.metadata_ref,
        Duration::days(request.validity_days),
    )?;

    info!(credential_id, "Credential issued via API");
    Ok(Json(IssueCredentialResponse { credential_id }))
}

/// Revoke a credential
///
/// POST /v1/credentials/{id}/revoke
pub async fn revoke_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CredentialId>,
    headers: HeaderMap,
) -> Result<Json<CredentialStateResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    state.ledger.revoke_credential(&caller, id)?;

    Ok(Json(CredentialStateResponse {
        credential_id: id,
        active: false,
    }))
}

/// Reactivate a revoked credential
///
/// POST /v1/credentials/{id}/reactivate
pub async fn reactivate_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CredentialId>,
    headers: HeaderMap,
) -> Result<Json<CredentialStateResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    state.ledger.reactivate_credential(&caller, id)?;

    Ok(Json(CredentialStateResponse {
        credential_id: id,
        active: true,
    }))
}

/// Check the validity predicate for a credential
///
/// GET /v1/credentials/{id}/valid
///
/// Never fails: unknown ids are simply invalid.
pub async fn credential_valid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CredentialId>,
) -> Json<CredentialValidResponse> {
    Json(CredentialValidResponse {
        credential_id: id,
        valid: state.ledger.is_credential_valid(id),
    })
}
