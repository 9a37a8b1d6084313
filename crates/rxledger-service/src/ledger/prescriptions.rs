//! Prescription ledger operations
//!
//! Creation and dispensing are credential-gated; dispensing additionally
//! requires presenting the patient and payload commitments byte-for-byte,
//! with a mismatch on either reported as its own tamper error for forensic
//! logging. Dispensability is recomputed from the prescriber credential's
//! current validity on every call — never cached at creation.

use tracing::{info, warn};

use rxledger_core::{
    AccessSecret, Commitment, CredentialKind, Identity, LedgerError, Prescription,
    PrescriptionId, PrescriptionStatus, Result,
};

use crate::events::EventKind;

use super::Ledger;

impl Ledger {
    /// Create a prescription; requires a valid prescriber credential
    ///
    /// Returns the new id and the capability secret. The secret is returned
    /// exactly once — it is skipped by every serialization of the record.
    pub fn create_prescription(
        &self,
        caller: &Identity,
        patient_commitment: Commitment,
        payload_commitment: Commitment,
        external_ref: impl Into<String>,
        validity_days: i64,
    ) -> Result<(PrescriptionId, AccessSecret)> {
        if patient_commitment.is_empty() {
            return Err(LedgerError::InvalidCommitment("Patient"));
        }
        if payload_commitment.is_empty() {
            return Err(LedgerError::InvalidCommitment("Payload"));
        }
        let external_ref = external_ref.into();
        if external_ref.trim().is_empty() {
            return Err(LedgerError::InvalidRef);
        }
        if validity_days <= 0 {
            return Err(LedgerError::InvalidValidity);
        }

        let mut state = self.state.write().unwrap();
        let now = self.clock.now();

        let credential_id = *state
            .holders
            .get(caller)
            .ok_or_else(|| LedgerError::NoCredential(caller.clone()))?;
        let credential = state
            .credentials
            .get(&credential_id)
            .ok_or(LedgerError::NotFound {
                entity: "credential",
                id: credential_id,
            })?;
        if !credential.is_valid(now) {
            return Err(LedgerError::InvalidCredential {
                credential: credential_id,
                reason: "expired or revoked".into(),
            });
        }
        if credential.kind != CredentialKind::Prescriber {
            return Err(LedgerError::InvalidCredential {
                credential: credential_id,
                reason: format!("kind {} cannot prescribe", credential.kind),
            });
        }

        let access_secret = AccessSecret::generate();
        let id = state.allocate_prescription_id();
        let prescription = Prescription {
            id,
            prescriber_credential: credential_id,
            patient_commitment,
            payload_commitment,
            external_ref,
            issued_at: now,
            expires_at: now + chrono::Duration::days(validity_days),
            status: PrescriptionStatus::Active,
            dispensed_at: None,
            pharmacist_credential: None,
            cancel_reason: None,
            access_secret: access_secret.clone(),
        };

        state.prescriptions.insert(id, prescription);
        state
            .prescribed_by
            .entry(credential_id)
            .or_default()
            .push(id);
        state.record(
            now,
            EventKind::PrescriptionCreated {
                prescription_id: id,
                prescriber_credential: credential_id,
            },
        );

        info!(
            prescription_id = id,
            prescriber_credential = credential_id,
            "Created prescription"
        );
        Ok((id, access_secret))
    }

    /// Dispense a prescription exactly once
    ///
    /// Preconditions are checked in order: record exists and is stored
    /// Active, validity window still open, caller holds a valid pharmacist
    /// credential, and both presented commitments equal the stored values.
    pub fn dispense_prescription(
        &self,
        id: PrescriptionId,
        patient_commitment: &Commitment,
        payload_commitment: &Commitment,
        caller: &Identity,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let now = self.clock.now();

        let (stored_patient, stored_payload) = {
            let prescription = state.prescriptions.get(&id).ok_or(LedgerError::NotFound {
                entity: "prescription",
                id,
            })?;
            if prescription.status != PrescriptionStatus::Active {
                return Err(LedgerError::NotActive(prescription.status));
            }
            if now > prescription.expires_at {
                return Err(LedgerError::Expired);
            }
            (
                prescription.patient_commitment.clone(),
                prescription.payload_commitment.clone(),
            )
        };

        let pharmacist_credential = *state
            .holders
            .get(caller)
            .ok_or_else(|| LedgerError::NoCredential(caller.clone()))?;
        let pharmacist = state
            .credentials
            .get(&pharmacist_credential)
            .ok_or(LedgerError::NotFound {
                entity: "credential",
                id: pharmacist_credential,
            })?;
        if !pharmacist.is_valid(now) {
            return Err(LedgerError::InvalidCredential {
                credential: pharmacist_credential,
                reason: "expired or revoked".into(),
            });
        }
        if pharmacist.kind != CredentialKind::Pharmacist {
            return Err(LedgerError::InvalidCredential {
                credential: pharmacist_credential,
                reason: format!("kind {} cannot dispense", pharmacist.kind),
            });
        }

        if &stored_patient != patient_commitment {
            warn!(
                prescription_id = id,
                stored = %stored_patient,
                presented = %patient_commitment,
                "Patient commitment mismatch on dispense — possible forgery"
            );
            return Err(LedgerError::PatientMismatch {
                expected: stored_patient,
                presented: patient_commitment.clone(),
            });
        }
        if &stored_payload != payload_commitment {
            warn!(
                prescription_id = id,
                stored = %stored_payload,
                presented = %payload_commitment,
                "Payload commitment mismatch on dispense — possible forgery"
            );
            return Err(LedgerError::PayloadMismatch {
                expected: stored_payload,
                presented: payload_commitment.clone(),
            });
        }

        {
            let prescription = state
                .prescriptions
                .get_mut(&id)
                .ok_or(LedgerError::NotFound {
                    entity: "prescription",
                    id,
                })?;
            prescription.status = PrescriptionStatus::Dispensed;
            prescription.dispensed_at = Some(now);
            prescription.pharmacist_credential = Some(pharmacist_credential);
        }
        state
            .dispensed_by
            .entry(pharmacist_credential)
            .or_default()
            .push(id);
        state.record(
            now,
            EventKind::PrescriptionDispensed {
                prescription_id: id,
                pharmacist_credential,
            },
        );

        info!(
            prescription_id = id,
            pharmacist_credential, "Dispensed prescription"
        );
        Ok(())
    }

    /// Cancel a prescription; only its original prescriber, only while the
    /// record is effectively Active
    pub fn cancel_prescription(
        &self,
        id: PrescriptionId,
        caller: &Identity,
        reason: &str,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let now = self.clock.now();

        let (prescriber_credential, status, expires_at) = {
            let prescription = state.prescriptions.get(&id).ok_or(LedgerError::NotFound {
                entity: "prescription",
                id,
            })?;
            (
                prescription.prescriber_credential,
                prescription.status,
                prescription.expires_at,
            )
        };

        match state.holders.get(caller) {
            Some(&credential_id) if credential_id == prescriber_credential => {}
            _ => return Err(LedgerError::NotPrescriber),
        }

        if status != PrescriptionStatus::Active {
            return Err(LedgerError::NotActive(status));
        }
        if now > expires_at {
            return Err(LedgerError::Expired);
        }
        if reason.trim().is_empty() {
            return Err(LedgerError::InvalidReason);
        }

        {
            let prescription = state
                .prescriptions
                .get_mut(&id)
                .ok_or(LedgerError::NotFound {
                    entity: "prescription",
                    id,
                })?;
            prescription.status = PrescriptionStatus::Cancelled;
            prescription.cancel_reason = Some(reason.to_string());
        }
        state.record(
            now,
            EventKind::PrescriptionCancelled {
                prescription_id: id,
                reason: reason.to_string(),
            },
        );

        info!(prescription_id = id, reason, "Cancelled prescription");
        Ok(())
    }

    /// Whether the prescription can currently be dispensed
    ///
    /// Recomputed on every call: stored Active, unexpired, and the creating
    /// prescriber credential still valid — revoking the prescriber makes all
    /// of their active prescriptions non-dispensable without touching them,
    /// and reactivation restores them.
    pub fn is_dispensable(&self, id: PrescriptionId) -> bool {
        let state = self.state.read().unwrap();
        let now = self.clock.now();

        match state.prescriptions.get(&id) {
            Some(prescription) => {
                prescription.status == PrescriptionStatus::Active
                    && now <= prescription.expires_at
                    && state
                        .credentials
                        .get(&prescription.prescriber_credential)
                        .map(|c| c.is_valid(now))
                        .unwrap_or(false)
            }
            None => false,
        }
    }

    /// Derived statuses for a batch of ids; `None` for unknown ids
    pub fn batch_status(&self, ids: &[PrescriptionId]) -> Vec<Option<PrescriptionStatus>> {
        let state = self.state.read().unwrap();
        let now = self.clock.now();

        ids.iter()
            .map(|id| {
                state
                    .prescriptions
                    .get(id)
                    .map(|prescription| prescription.effective_status(now))
            })
            .collect()
    }

    /// Read a prescription record via its capability secret
    pub fn prescription_details(
        &self,
        id: PrescriptionId,
        presented_secret: &str,
    ) -> Result<Prescription> {
        let state = self.state.read().unwrap();
        let prescription = state.prescriptions.get(&id).ok_or(LedgerError::NotFound {
            entity: "prescription",
            id,
        })?;

        if !prescription.access_secret.matches(presented_secret) {
            warn!(
                prescription_id = id,
                "Rejected detail read with non-matching access secret"
            );
            return Err(LedgerError::InvalidSecret);
        }

        Ok(prescription.clone())
    }
}
