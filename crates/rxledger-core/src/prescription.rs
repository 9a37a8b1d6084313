//! Prescription records
//!
//! A prescription is a single-dispense unit of work. Its commitments are
//! immutable once created, its stored status only ever moves
//! Active → Dispensed | Cancelled, and expiry is never stored: it is derived
//! from the clock on every read, so no background sweep exists anywhere in
//! the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commitment::{AccessSecret, Commitment};
use crate::credential::CredentialId;

/// Sequential prescription identifier, starting at 1
pub type PrescriptionId = u64;

/// Prescription status
///
/// Only `Active`, `Dispensed` and `Cancelled` are ever stored. `Expired` is
/// derived: an Active record past its `expires_at` reports Expired from
/// [`Prescription::effective_status`] without any stored transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Active,
    Dispensed,
    Cancelled,
    Expired,
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrescriptionStatus::Active => write!(f, "active"),
            PrescriptionStatus::Dispensed => write!(f, "dispensed"),
            PrescriptionStatus::Cancelled => write!(f, "cancelled"),
            PrescriptionStatus::Expired => write!(f, "expired"),
        }
    }
}

/// A single-dispense prescription
///
/// The access secret is returned to the creator exactly once and is skipped
/// by serialization so it can never leave the ledger through a record read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prescription {
    /// Sequential identifier
    pub id: PrescriptionId,

    /// Credential of the prescriber who created this record
    pub prescriber_credential: CredentialId,

    /// Commitment to patient-identifying data — immutable once created
    pub patient_commitment: Commitment,

    /// Commitment to the prescription's sensitive content — immutable
    pub payload_commitment: Commitment,

    /// Opaque pointer to the encrypted off-ledger payload
    pub external_ref: String,

    /// When the prescription was created
    pub issued_at: DateTime<Utc>,

    /// When the prescription expires
    pub expires_at: DateTime<Utc>,

    /// Stored status — never `Expired` (see [`PrescriptionStatus`])
    pub status: PrescriptionStatus,

    /// When the prescription was dispensed, if it was
    pub dispensed_at: Option<DateTime<Utc>>,

    /// Credential of the pharmacist who dispensed it, if any
    pub pharmacist_credential: Option<CredentialId>,

    /// Reason given at cancellation, if cancelled
    pub cancel_reason: Option<String>,

    /// Capability token for out-of-band detail access
    #[serde(skip_serializing)]
    pub access_secret: AccessSecret,
}

impl Prescription {
    /// Status with the time-derived Expired rule applied
    pub fn effective_status(&self, now: DateTime<Utc>) -> PrescriptionStatus {
        if self.status == PrescriptionStatus::Active && now > self.expires_at {
            PrescriptionStatus::Expired
        } else {
            self.status
        }
    }

    /// Whether the record is past its expiry while still stored Active
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == PrescriptionStatus::Expired
    }
}
