//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use rxledger_core::LedgerError;

use crate::auth::AuthError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(AuthError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::Unauthorized(err) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                err.to_string(),
                None,
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
                None,
            ),
            ApiError::Ledger(err) => map_ledger_error(err),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Map each ledger error to (status, code, message, details)
///
/// Authorization failures are 403 (the caller is authenticated, just not
/// allowed), validation 400, state conflicts 409 so callers can tell
/// "someone else already did this" from a real failure, tamper 403 with the
/// mismatching commitments in the details.
fn map_ledger_error(
    err: &LedgerError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    use LedgerError::*;

    let message = err.to_string();
    match err {
        // Authorization
        NotIssuer => (StatusCode::FORBIDDEN, "NOT_ISSUER", message, None),
        NoCredential(_) => (StatusCode::FORBIDDEN, "NO_CREDENTIAL", message, None),
        InvalidCredential { .. } => {
            (StatusCode::FORBIDDEN, "INVALID_CREDENTIAL", message, None)
        }
        NotSigner(_) => (StatusCode::FORBIDDEN, "NOT_SIGNER", message, None),
        NotPrescriber => (StatusCode::FORBIDDEN, "NOT_PRESCRIBER", message, None),
        InvalidSecret => (StatusCode::FORBIDDEN, "INVALID_SECRET", message, None),

        // Validation
        InvalidHolder => (StatusCode::BAD_REQUEST, "INVALID_HOLDER", message, None),
        InvalidLicense => (StatusCode::BAD_REQUEST, "INVALID_LICENSE", message, None),
        InvalidMetadata => (StatusCode::BAD_REQUEST, "INVALID_METADATA", message, None),
        InvalidCommitment(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_COMMITMENT", message, None)
        }
        InvalidRef => (StatusCode::BAD_REQUEST, "INVALID_REF", message, None),
        DuplicateHolder(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_HOLDER", message, None),
        InvalidReason => (StatusCode::BAD_REQUEST, "INVALID_REASON", message, None),
        InvalidValidity => (StatusCode::BAD_REQUEST, "INVALID_VALIDITY", message, None),
        InvalidPayload(_) => (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", message, None),
        AlreadySigner(_) => (StatusCode::BAD_REQUEST, "ALREADY_SIGNER", message, None),

        // State conflicts
        NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
        NotActive(_) => (StatusCode::CONFLICT, "NOT_ACTIVE", message, None),
        Expired => (StatusCode::CONFLICT, "EXPIRED", message, None),
        AlreadyApproved(_) => (StatusCode::CONFLICT, "ALREADY_APPROVED", message, None),
        AlreadyExecuted => (StatusCode::CONFLICT, "ALREADY_EXECUTED", message, None),
        ThresholdNotMet { approvals, threshold } => (
            StatusCode::CONFLICT,
            "THRESHOLD_NOT_MET",
            message,
            Some(serde_json::json!({
                "approvals": approvals,
                "threshold": threshold,
            })),
        ),
        InsufficientSigners { remaining, threshold } => (
            StatusCode::CONFLICT,
            "INSUFFICIENT_SIGNERS",
            message,
            Some(serde_json::json!({
                "remaining": remaining,
                "threshold": threshold,
            })),
        ),

        // Tamper detection
        PatientMismatch { expected, presented } => (
            StatusCode::FORBIDDEN,
            "PATIENT_MISMATCH",
            "Patient commitment does not match the stored value".to_string(),
            Some(serde_json::json!({
                "stored": expected.to_hex(),
                "presented": presented.to_hex(),
            })),
        ),
        PayloadMismatch { expected, presented } => (
            StatusCode::FORBIDDEN,
            "PAYLOAD_MISMATCH",
            "Payload commitment does not match the stored value".to_string(),
            Some(serde_json::json!({
                "stored": expected.to_hex(),
                "presented": presented.to_hex(),
            })),
        ),
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err)
    }
}

impl From<hex::FromHexError> for ApiError {
    fn from(err: hex::FromHexError) -> Self {
        ApiError::BadRequest(format!("Invalid hex encoding: {}", err))
    }
}
