//! Request handlers for the ledger API

pub mod credentials;
pub mod governance;
pub mod prescriptions;

pub use credentials::{issue_credential, reactivate_credential, revoke_credential, credential_valid};
pub use governance::{approve_action, execute_action, list_signers, propose_action};
pub use prescriptions::{
    batch_status, cancel_prescription, create_prescription, dispense_prescription,
    prescription_details, prescription_dispensable,
};

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use rxledger_core::Identity;

use crate::api::error::ApiError;
use crate::auth::{AuthError, IdentityVerifier};
use crate::ledger::Ledger;

/// Service configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Human-readable name of this ledger instance
    pub service_name: Option<String>,
}

/// Application state shared across handlers
pub struct AppState {
    /// The transactional ledger
    pub ledger: Arc<Ledger>,
    /// Resolves bearer tokens to caller identities
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Service configuration
    pub config: ServiceConfig,
}

/// Resolve the caller identity from the Authorization header
pub(crate) async fn caller_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identity, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized(AuthError::MissingToken))?;

    Ok(state.verifier.verify(token).await?)
}
