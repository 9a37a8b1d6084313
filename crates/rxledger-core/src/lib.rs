//! # Rxledger Core
//!
//! Core types for the rxledger credential-gated prescription ledger:
//! credentials bound to identities, single-dispense prescriptions carrying
//! tamper-evident commitments, and multi-signer admin actions.
//!
//! ## Key Concepts
//!
//! - **Credential**: non-transferable, revocable authorization record binding
//!   an identity to a role (prescriber or pharmacist) with an expiry
//! - **Prescription**: single-dispense unit of work carrying commitments to
//!   its patient and payload
//! - **Commitment**: one-way hash binding a caller to specific content for
//!   later exact-byte tamper detection
//! - **AdminAction**: privileged operation requiring N-of-M signer approval
//!
//! ## Ledger Invariants
//!
//! 1. **Single issuance**: at most one credential record per holder, ever
//! 2. **Single dispense**: a prescription's status moves one way,
//!    Active → Dispensed | Cancelled
//! 3. **Tamper evidence**: dispensing requires presenting commitments that
//!    match the stored ones byte-for-byte
//!
//! This crate is pure data model: no I/O, no clocks, no storage. The
//! transactional state machine over these types lives in `rxledger-service`.

pub mod commitment;
pub mod credential;
pub mod error;
pub mod governance;
pub mod identity;
pub mod prescription;

pub use commitment::{AccessSecret, Commitment};
pub use credential::{Credential, CredentialId, CredentialKind};
pub use error::{LedgerError, Result};
pub use governance::{
    decode_signer_payload, encode_signer_payload, ActionNonce, AdminAction, AdminActionKind,
    AuditTrailRequest,
};
pub use identity::{Identity, IdentityScheme};
pub use prescription::{Prescription, PrescriptionId, PrescriptionStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
