//! Rxledger Service
//!
//! The transactional core of the prescription ledger:
//! - Issues, revokes and reactivates non-transferable credentials
//! - Runs the single-dispense prescription state machine with tamper
//!   detection over patient/payload commitments
//! - Gates privileged operations behind N-of-M signer approval
//!
//! Every state-mutating operation is linearizable: the whole ledger state
//! sits behind one writer lock, preconditions are evaluated against the
//! locked snapshot, and the mutation commits before the lock is released.
//! Reads are served from a read-consistent snapshot. Expiry is recomputed
//! from the clock on every read; there is no background sweep.
//!
//! ## API Endpoints
//!
//! ### Health
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check with ledger counts
//!
//! ### Credentials
//! - `POST /v1/credentials` - Issue a credential (issuer only)
//! - `POST /v1/credentials/{id}/revoke` - Revoke (issuer only)
//! - `POST /v1/credentials/{id}/reactivate` - Reactivate (issuer only)
//! - `GET /v1/credentials/{id}/valid` - Validity predicate
//!
//! ### Prescriptions
//! - `POST /v1/prescriptions` - Create (prescriber credential required)
//! - `POST /v1/prescriptions/{id}/dispense` - Dispense exactly once
//! - `POST /v1/prescriptions/{id}/cancel` - Cancel (original prescriber)
//! - `POST /v1/prescriptions/{id}/details` - Detail read via capability secret
//! - `GET /v1/prescriptions/{id}/dispensable` - Computed dispensability
//! - `POST /v1/prescriptions/status` - Batch derived statuses
//!
//! ### Governance
//! - `POST /v1/governance/actions` - Propose a privileged action
//! - `POST /v1/governance/actions/{nonce}/approve` - Approve
//! - `POST /v1/governance/actions/{nonce}/execute` - Execute once threshold met
//! - `GET /v1/governance/signers` - Current signer set and threshold

pub mod api;
pub mod auth;
pub mod clock;
pub mod events;
pub mod ledger;

pub use api::create_router;
pub use api::handlers::{AppState, ServiceConfig};
pub use auth::{AuthError, IdentityVerifier, MockVerifier, StaticTokenVerifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{EventKind, LedgerEvent};
pub use ledger::{ExecutionOutcome, Ledger};
