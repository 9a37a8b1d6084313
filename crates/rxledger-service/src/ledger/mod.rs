//! The transactional ledger
//!
//! `Ledger` holds every table — credentials, prescriptions, admin actions,
//! signer set, audit trails, event log — behind a single writer lock. Each
//! mutating operation takes the write lock once, evaluates all of its
//! preconditions against that snapshot, and commits before releasing, so
//! operations are linearizable and a failed precondition leaves zero
//! mutation behind. Reads take the read lock and see a consistent snapshot.
//!
//! No I/O happens inside the lock: encryption, blob fetches and delivery all
//! live strictly outside the core, before or after a call.

pub mod credentials;
pub mod governance;
pub mod prescriptions;

pub use governance::ExecutionOutcome;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::info;

use rxledger_core::{
    ActionNonce, AdminAction, Credential, CredentialId, Identity, LedgerError, Prescription,
    PrescriptionId, Result,
};

use crate::clock::{Clock, SystemClock};
use crate::events::{EventKind, LedgerEvent};

/// The credential-gated prescription ledger
#[derive(Debug)]
pub struct Ledger {
    state: RwLock<LedgerState>,
    issuer: Identity,
    threshold: usize,
    clock: Arc<dyn Clock>,
}

/// All mutable ledger state, guarded as one unit
#[derive(Debug)]
struct LedgerState {
    credentials: HashMap<CredentialId, Credential>,
    /// holder → credential id; entries are never removed (single issuance
    /// holds across revocation)
    holders: HashMap<Identity, CredentialId>,
    prescriptions: HashMap<PrescriptionId, Prescription>,
    actions: HashMap<ActionNonce, AdminAction>,
    signers: HashSet<Identity>,
    /// Append-only trails of prescription ids, by creating credential
    prescribed_by: HashMap<CredentialId, Vec<PrescriptionId>>,
    /// Append-only trails of prescription ids, by dispensing credential
    dispensed_by: HashMap<CredentialId, Vec<PrescriptionId>>,
    events: Vec<LedgerEvent>,
    next_credential_id: CredentialId,
    next_prescription_id: PrescriptionId,
    next_nonce: ActionNonce,
}

impl LedgerState {
    fn new(signers: HashSet<Identity>) -> Self {
        Self {
            credentials: HashMap::new(),
            holders: HashMap::new(),
            prescriptions: HashMap::new(),
            actions: HashMap::new(),
            signers,
            prescribed_by: HashMap::new(),
            dispensed_by: HashMap::new(),
            events: Vec::new(),
            next_credential_id: 1,
            next_prescription_id: 1,
            next_nonce: 1,
        }
    }

    fn allocate_credential_id(&mut self) -> CredentialId {
        let id = self.next_credential_id;
        self.next_credential_id += 1;
        id
    }

    fn allocate_prescription_id(&mut self) -> PrescriptionId {
        let id = self.next_prescription_id;
        self.next_prescription_id += 1;
        id
    }

    fn allocate_nonce(&mut self) -> ActionNonce {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        nonce
    }

    /// Append an audit event; called inside the same critical section as the
    /// mutation it records
    fn record(&mut self, at: DateTime<Utc>, kind: EventKind) {
        self.events.push(LedgerEvent { at, kind });
    }
}

impl Ledger {
    /// Create a ledger on the system clock
    ///
    /// `issuer` is the only identity allowed to issue/revoke/reactivate
    /// credentials. `signers` and `threshold` configure governance; the
    /// threshold is fixed for the ledger's lifetime while the signer set
    /// changes only through governance itself.
    pub fn new(
        issuer: Identity,
        signers: impl IntoIterator<Item = Identity>,
        threshold: usize,
    ) -> Result<Self> {
        Self::with_clock(issuer, signers, threshold, Arc::new(SystemClock))
    }

    /// Create a ledger on an explicit clock (tests use [`crate::ManualClock`])
    pub fn with_clock(
        issuer: Identity,
        signers: impl IntoIterator<Item = Identity>,
        threshold: usize,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let signers: HashSet<Identity> = signers.into_iter().collect();
        if threshold == 0 || signers.len() < threshold {
            return Err(LedgerError::InsufficientSigners {
                remaining: signers.len(),
                threshold,
            });
        }

        info!(
            issuer = %issuer,
            signers = signers.len(),
            threshold,
            "Ledger initialized"
        );

        Ok(Self {
            state: RwLock::new(LedgerState::new(signers)),
            issuer,
            threshold,
            clock,
        })
    }

    /// The trusted issuer identity
    pub fn issuer(&self) -> &Identity {
        &self.issuer
    }

    /// Approvals required to execute a privileged action
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The ledger's current time, from its configured clock
    pub fn current_time(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Number of credential records ever issued
    pub fn credential_count(&self) -> usize {
        self.state.read().unwrap().credentials.len()
    }

    /// Number of prescription records ever created
    pub fn prescription_count(&self) -> usize {
        self.state.read().unwrap().prescriptions.len()
    }

    /// Current signer count
    pub fn signer_count(&self) -> usize {
        self.state.read().unwrap().signers.len()
    }

    /// Snapshot of the append-only event log
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.state.read().unwrap().events.clone()
    }
}
