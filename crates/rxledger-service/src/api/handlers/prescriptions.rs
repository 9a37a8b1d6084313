//! Prescription ledger handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use rxledger_core::{Commitment, Prescription, PrescriptionId, PrescriptionStatus};

use crate::api::error::ApiError;

use super::{caller_identity, AppState};

/// Request to create a prescription
#[derive(Debug, Deserialize)]
pub struct CreatePrescriptionRequest {
    /// Hex-encoded commitment to patient-identifying data
    pub patient_commitment: String,

    /// Hex-encoded commitment to the prescription content
    pub payload_commitment: String,

    /// Opaque pointer to the encrypted off-ledger payload
    pub external_ref: String,

    /// Validity window in days
    pub validity_days: i64,
}

/// Response from prescription creation
///
/// Carries the capability secret — the only time it ever leaves the ledger.
#[derive(Debug, Serialize)]
pub struct CreatePrescriptionResponse {
    pub prescription_id: PrescriptionId,
    pub access_secret: String,
}

/// Request to dispense a prescription
#[derive(Debug, Deserialize)]
pub struct DispenseRequest {
    /// Hex-encoded patient commitment, must match the stored value
    pub patient_commitment: String,

    /// Hex-encoded payload commitment, must match the stored value
    pub payload_commitment: String,
}

/// Request to cancel a prescription
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

/// Request to read a prescription's details
#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    pub access_secret: String,
}

/// Prescription details with the time-derived status applied
#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub effective_status: PrescriptionStatus,
    #[serde(flatten)]
    pub prescription: Prescription,
}

/// Status response after a state-changing call
#[derive(Debug, Serialize)]
pub struct PrescriptionStateResponse {
    pub prescription_id: PrescriptionId,
    pub status: PrescriptionStatus,
}

/// Dispensability response
#[derive(Debug, Serialize)]
pub struct DispensableResponse {
    pub prescription_id: PrescriptionId,
    pub dispensable: bool,
}

/// Batch status request
#[derive(Debug, Deserialize)]
pub struct BatchStatusRequest {
    pub ids: Vec<PrescriptionId>,
}

/// Batch status response; `null` for unknown ids
#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub statuses: Vec<Option<PrescriptionStatus>>,
}

/// Create a prescription
///
/// POST /v1/prescriptions
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<Json<CreatePrescriptionResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    let patient_commitment = Commitment::from_hex(&request.patient_commitment)?;
    let payload_commitment = Commitment::from_hex(&request.payload_commitment)?;

    let (prescription_id, access_secret) = state.ledger.create_prescription(
        &caller,
        patient_commitment,
        payload_commitment,
        request.external_ref,
        request.validity_days,
    )?;

    info!(prescription_id, "Prescription created via API");
    Ok(Json(CreatePrescriptionResponse {
        prescription_id,
        access_secret: access_secret.expose().to_string(),
    }))
}

/// Dispense a prescription exactly once
///
/// POST /v1/prescriptions/{id}/dispense
pub async fn dispense_prescription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PrescriptionId>,
    headers: HeaderMap,
    Json(request): Json<DispenseRequest>,
) -> Result<Json<PrescriptionStateResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    let patient_commitment = Commitment::from_hex(&request.patient_commitment)?;
    let payload_commitment = Commitment::from_hex(&request.payload_commitment)?;

    state
        .ledger
        .dispense_prescription(id, &patient_commitment, &payload_commitment, &caller)?;

    Ok(Json(PrescriptionStateResponse {
        prescription_id: id,
        status: PrescriptionStatus::Dispensed,
    }))
}

/// Cancel a prescription
///
/// POST /v1/prescriptions/{id}/cancel
pub async fn cancel_prescription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PrescriptionId>,
    headers: HeaderMap,
    Json(request): Json<CancelRequest>,
) -> Result<Json<PrescriptionStateResponse>, ApiError> {
    let caller = caller_identity(&state, &headers).await?;
    state.ledger.cancel_prescription(id, &caller, &request.reason)?;

    Ok(Json(PrescriptionStateResponse {
        prescription_id: id,
        status: PrescriptionStatus::Cancelled,
    }))
}

/// Read a prescription's details via its capability secret
///
/// POST /v1/prescriptions/{id}/details
///
/// The secret travels in the body rather than the path so it never lands in
/// access logs.
pub async fn prescription_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PrescriptionId>,
    Json(request): Json<DetailsRequest>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let prescription = state
        .ledger
        .prescription_details(id, &request.access_secret)?;
    let effective_status = prescription.effective_status(state.ledger.current_time());

    Ok(Json(DetailsResponse {
        effective_status,
        prescription,
    }))
}

/// Computed dispensability for a prescription
///
/// GET /v1/prescriptions/{id}/dispensable
pub async fn prescription_dispensable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PrescriptionId>,
) -> Json<DispensableResponse> {
    Json(DispensableResponse {
        prescription_id: id,
        dispensable: state.ledger.is_dispensable(id),
    })
}

/// Derived statuses for a batch of prescription ids
///
/// POST /v1/prescriptions/status
pub async fn batch_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchStatusRequest>,
) -> Json<BatchStatusResponse> {
    Json(BatchStatusResponse {
        statuses: state.ledger.batch_status(&request.ids),
    })
}
