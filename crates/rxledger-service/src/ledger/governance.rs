//! N-of-M governance operations
//!
//! One generic propose → approve → execute state machine for every
//! privileged action kind; only the effect-application step differs per
//! kind. The signer set governs its own membership through the same path,
//! with a guard keeping the set at least as large as the threshold. Effect
//! application and the executed flag commit under a single write-lock
//! acquisition, so partial execution is never observable.

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use rxledger_core::{
    decode_signer_payload, ActionNonce, AdminAction, AdminActionKind, AuditTrailRequest,
    CredentialId, Identity, LedgerError, PrescriptionId, Result,
};

use crate::events::EventKind;

use super::Ledger;

/// The effect applied by a successful [`Ledger::execute`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    SignerAdded {
        signer: Identity,
    },
    SignerRemoved {
        signer: Identity,
    },
    AuditTrailDisclosed {
        credential_id: CredentialId,
        prescribed: Vec<PrescriptionId>,
        dispensed: Vec<PrescriptionId>,
    },
}

impl Ledger {
    /// Propose a privileged action; the proposer's approval is recorded
    /// immediately
    pub fn propose(
        &self,
        caller: &Identity,
        kind: AdminActionKind,
        payload: Vec<u8>,
    ) -> Result<ActionNonce> {
        let mut state = self.state.write().unwrap();
        if !state.signers.contains(caller) {
            return Err(LedgerError::NotSigner(caller.clone()));
        }

        let now = self.clock.now();
        let nonce = state.allocate_nonce();
        let action = AdminAction {
            nonce,
            kind,
            payload,
            approvals: HashSet::from([caller.clone()]),
            executed: false,
            proposed_by: caller.clone(),
            proposed_at: now,
        };

        state.actions.insert(nonce, action);
        state.record(
            now,
            EventKind::ActionProposed {
                nonce,
                kind,
                proposed_by: caller.clone(),
            },
        );

        info!(nonce, kind = %kind, proposed_by = %caller, "Proposed admin action");
        Ok(nonce)
    }

    /// Approve a pending action; returns the new distinct-approval count
    ///
    /// A signer approving twice gets `AlreadyApproved` rather than a silent
    /// no-op, so caller-side logic errors surface.
    pub fn approve(&self, caller: &Identity, nonce: ActionNonce) -> Result<usize> {
        let mut state = self.state.write().unwrap();
        if !state.signers.contains(caller) {
            return Err(LedgerError::NotSigner(caller.clone()));
        }

        let now = self.clock.now();
        let approvals = {
            let action = state.actions.get_mut(&nonce).ok_or(LedgerError::NotFound {
                entity: "action",
                id: nonce,
            })?;
            if action.executed {
                return Err(LedgerError::AlreadyExecuted);
            }
            if action.approvals.contains(caller) {
                return Err(LedgerError::AlreadyApproved(caller.clone()));
            }
            action.approvals.insert(caller.clone());
            action.approvals.len()
        };

        state.record(
            now,
            EventKind::ActionApproved {
                nonce,
                approved_by: caller.clone(),
                approvals,
            },
        );

        info!(nonce, approved_by = %caller, approvals, "Approved admin action");
        Ok(approvals)
    }

    /// Execute an action once its approvals reach the threshold
    ///
    /// Execution is an explicit step: reaching the threshold never applies
    /// an effect on its own.
    pub fn execute(&self, caller: &Identity, nonce: ActionNonce) -> Result<ExecutionOutcome> {
        let mut state = self.state.write().unwrap();
        if !state.signers.contains(caller) {
            return Err(LedgerError::NotSigner(caller.clone()));
        }

        let now = self.clock.now();
        let (kind, payload) = {
            let action = state.actions.get(&nonce).ok_or(LedgerError::NotFound {
                entity: "action",
                id: nonce,
            })?;
            if action.executed {
                return Err(LedgerError::AlreadyExecuted);
            }
            if action.approvals.len() < self.threshold {
                return Err(LedgerError::ThresholdNotMet {
                    approvals: action.approvals.len(),
                    threshold: self.threshold,
                });
            }
            (action.kind, action.payload.clone())
        };

        let outcome = match kind {
            AdminActionKind::AddSigner => {
                let signer = decode_signer_payload(&payload)
                    .map_err(|e| LedgerError::InvalidPayload(e.to_string()))?;
                if state.signers.contains(&signer) {
                    return Err(LedgerError::AlreadySigner(signer));
                }
                state.signers.insert(signer.clone());
                info!(nonce, signer = %signer, "Added signer");
                ExecutionOutcome::SignerAdded { signer }
            }
            AdminActionKind::RemoveSigner => {
                let signer = decode_signer_payload(&payload)
                    .map_err(|e| LedgerError::InvalidPayload(e.to_string()))?;
                if !state.signers.contains(&signer) {
                    return Err(LedgerError::NotSigner(signer));
                }
                if state.signers.len() - 1 < self.threshold {
                    return Err(LedgerError::InsufficientSigners {
                        remaining: state.signers.len() - 1,
                        threshold: self.threshold,
                    });
                }
                state.signers.remove(&signer);
                info!(nonce, signer = %signer, "Removed signer");
                ExecutionOutcome::SignerRemoved { signer }
            }
            AdminActionKind::DiscloseAuditTrail => {
                let request = AuditTrailRequest::decode(&payload)
                    .map_err(|e| LedgerError::InvalidPayload(e.to_string()))?;
                let credential_id = request.credential_id;
                if !state.credentials.contains_key(&credential_id) {
                    return Err(LedgerError::NotFound {
                        entity: "credential",
                        id: credential_id,
                    });
                }

                let prescribed = state
                    .prescribed_by
                    .get(&credential_id)
                    .cloned()
                    .unwrap_or_default();
                let dispensed = state
                    .dispensed_by
                    .get(&credential_id)
                    .cloned()
                    .unwrap_or_default();
                state.record(now, EventKind::AuditTrailDisclosed { credential_id });

                info!(nonce, credential_id, "Disclosed audit trail");
                ExecutionOutcome::AuditTrailDisclosed {
                    credential_id,
                    prescribed,
                    dispensed,
                }
            }
        };

        {
            let action = state.actions.get_mut(&nonce).ok_or(LedgerError::NotFound {
                entity: "action",
                id: nonce,
            })?;
            action.executed = true;
        }
        state.record(now, EventKind::ActionExecuted { nonce, kind });

        info!(nonce, kind = %kind, executed_by = %caller, "Executed admin action");
        Ok(outcome)
    }

    /// Current signer set, sorted for stable output
    pub fn signers(&self) -> Vec<Identity> {
        let state = self.state.read().unwrap();
        let mut signers: Vec<Identity> = state.signers.iter().cloned().collect();
        signers.sort_by_key(|s| s.to_string());
        signers
    }

    /// Fetch an admin action record
    pub fn action(&self, nonce: ActionNonce) -> Option<AdminAction> {
        self.state.read().unwrap().actions.get(&nonce).cloned()
    }
}
