//! Error taxonomy for the ledger
//!
//! Four categories, each with distinct handling at the caller:
//!
//! - **Authorization** — retrying without a credential change cannot succeed
//! - **Validation** — the caller's input is malformed; caller-fixable
//! - **State conflict** — someone else already moved the state; reported
//!   distinctly, never coerced to success
//! - **Tamper** — the presented commitments differ from the stored ones;
//!   possible forgery, logged in detail (commitments only, never raw data)
//!
//! Every failure is a typed return with zero mutation behind it.

use thiserror::Error;

use crate::commitment::Commitment;
use crate::credential::CredentialId;
use crate::identity::Identity;
use crate::prescription::PrescriptionStatus;

/// Result type alias using LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in the ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    // =========================================================================
    // Authorization
    // =========================================================================
    /// Caller is not the trusted issuer
    #[error("Caller is not the credential issuer")]
    NotIssuer,

    /// Caller holds no credential at all
    #[error("No credential held by '{0}'")]
    NoCredential(Identity),

    /// Caller's credential exists but does not authorize the operation
    #[error("Credential {credential} is not valid here: {reason}")]
    InvalidCredential {
        credential: CredentialId,
        reason: String,
    },

    /// Caller is not a governance signer
    #[error("'{0}' is not a signer")]
    NotSigner(Identity),

    /// Caller did not create the prescription it is trying to cancel
    #[error("Caller is not the prescribing credential holder")]
    NotPrescriber,

    /// Presented capability secret does not match the stored one
    #[error("Access secret does not match")]
    InvalidSecret,

    // =========================================================================
    // Validation
    // =========================================================================
    /// Holder identity is empty
    #[error("Holder identity must be non-empty")]
    InvalidHolder,

    /// License commitment is empty
    #[error("License commitment must be non-empty")]
    InvalidLicense,

    /// Metadata reference is empty
    #[error("Metadata reference must be non-empty")]
    InvalidMetadata,

    /// A commitment field is empty
    #[error("{0} commitment must be non-empty")]
    InvalidCommitment(&'static str),

    /// External reference is empty
    #[error("External reference must be non-empty")]
    InvalidRef,

    /// A credential record already exists for this holder, active or not
    #[error("A credential record already exists for '{0}'")]
    DuplicateHolder(Identity),

    /// Cancellation reason is empty
    #[error("Cancellation reason must be non-empty")]
    InvalidReason,

    /// Validity period is zero or negative
    #[error("Validity period must be positive")]
    InvalidValidity,

    /// Action payload could not be decoded for its action kind
    #[error("Action payload could not be decoded: {0}")]
    InvalidPayload(String),

    /// Identity is already in the signer set
    #[error("'{0}' is already a signer")]
    AlreadySigner(Identity),

    // =========================================================================
    // State conflict
    // =========================================================================
    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Prescription is no longer active
    #[error("Prescription is not active (status: {0})")]
    NotActive(PrescriptionStatus),

    /// Prescription validity window has passed
    #[error("Prescription has expired")]
    Expired,

    /// Signer already approved this action
    #[error("'{0}' already approved this action")]
    AlreadyApproved(Identity),

    /// Action was already executed
    #[error("Action already executed")]
    AlreadyExecuted,

    /// Not enough distinct approvals to execute
    #[error("Not enough approvals: {approvals} of {threshold} required")]
    ThresholdNotMet { approvals: usize, threshold: usize },

    /// Removal would leave fewer signers than the threshold
    #[error("Removal would leave {remaining} signers, below threshold {threshold}")]
    InsufficientSigners { remaining: usize, threshold: usize },

    // =========================================================================
    // Tamper detection
    // =========================================================================
    /// Presented patient commitment differs from the stored one
    #[error("Patient commitment mismatch: stored {expected}, presented {presented}")]
    PatientMismatch {
        expected: Commitment,
        presented: Commitment,
    },

    /// Presented payload commitment differs from the stored one
    #[error("Payload commitment mismatch: stored {expected}, presented {presented}")]
    PayloadMismatch {
        expected: Commitment,
        presented: Commitment,
    },
}

impl LedgerError {
    /// True for tamper-detection errors, which deserve forensic logging
    pub fn is_tamper(&self) -> bool {
        matches!(
            self,
            LedgerError::PatientMismatch { .. } | LedgerError::PayloadMismatch { .. }
        )
    }
}
