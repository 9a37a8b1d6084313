//! Append-only audit events
//!
//! Every successful mutation appends exactly one event to the in-state log,
//! inside the same critical section as the mutation itself, and mirrors it
//! to `tracing`. Events are an observation mechanism for host-side indexing
//! and audit; no component reacts to them synchronously.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rxledger_core::{
    ActionNonce, AdminActionKind, CredentialId, CredentialKind, Identity, PrescriptionId,
};

/// A timestamped audit event
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEvent {
    /// When the mutation committed
    pub at: DateTime<Utc>,

    /// What happened
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Event payloads
///
/// Carries ids and commitment-safe metadata only — never raw patient or
/// payload data, and never access secrets.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    CredentialIssued {
        credential_id: CredentialId,
        holder: Identity,
        kind: CredentialKind,
    },
    CredentialRevoked {
        credential_id: CredentialId,
    },
    CredentialReactivated {
        credential_id: CredentialId,
    },
    PrescriptionCreated {
        prescription_id: PrescriptionId,
        prescriber_credential: CredentialId,
    },
    PrescriptionDispensed {
        prescription_id: PrescriptionId,
        pharmacist_credential: CredentialId,
    },
    PrescriptionCancelled {
        prescription_id: PrescriptionId,
        reason: String,
    },
    ActionProposed {
        nonce: ActionNonce,
        kind: AdminActionKind,
        proposed_by: Identity,
    },
    ActionApproved {
        nonce: ActionNonce,
        approved_by: Identity,
        approvals: usize,
    },
    ActionExecuted {
        nonce: ActionNonce,
        kind: AdminActionKind,
    },
    AuditTrailDisclosed {
        credential_id: CredentialId,
    },
}
