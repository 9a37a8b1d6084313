//! Credential registry operations
//!
//! Issuance is issuer-only and single-shot per holder: one record per
//! identity, ever, with revocation flipping `active` rather than deleting.
//! Validity is recomputed from the clock on every check, so a revoked or
//! expired credential invalidates everything gated on it without touching
//! any other record.

use chrono::Duration;
use tracing::info;

use rxledger_core::{
    Commitment, Credential, CredentialId, CredentialKind, Identity, LedgerError, Result,
};

use crate::events::EventKind;

use super::Ledger;

impl Ledger {
    /// Issue a credential binding `holder` to `kind`
    ///
    /// Fails with `DuplicateHolder` if any record for the holder exists,
    /// active or not — re-issuance after revocation is deliberately not
    /// possible.
    pub fn issue_credential(
        &self,
        caller: &Identity,
        holder: Identity,
        kind: CredentialKind,
        license_commitment: Commitment,
        specialty: impl Into<String>,
        metadata_ref: impl Into<String>,
        validity: Duration,
    ) -> Result<CredentialId> {
        if caller != &self.issuer {
            return Err(LedgerError::NotIssuer);
        }
        if holder.value.trim().is_empty() {
            return Err(LedgerError::InvalidHolder);
        }
        if license_commitment.is_empty() {
            return Err(LedgerError::InvalidLicense);
        }
        let metadata_ref = metadata_ref.into();
        if metadata_ref.trim().is_empty() {
            return Err(LedgerError::InvalidMetadata);
        }
        if validity <= Duration::zero() {
            return Err(LedgerError::InvalidValidity);
        }

        let mut state = self.state.write().unwrap();
        if state.holders.contains_key(&holder) {
            return Err(LedgerError::DuplicateHolder(holder));
        }

        let now = self.clock.now();
        let id = state.allocate_credential_id();
        let credential = Credential {
            id,
            holder: holder.clone(),
            kind,
            license_commitment,
            specialty: specialty.into(),
            metadata_ref,
            issued_at: now,
            expires_at: now + validity,
            active: true,
        };

        state.holders.insert(holder.clone(), id);
        state.credentials.insert(id, credential);
        state.record(
            now,
            EventKind::CredentialIssued {
                credential_id: id,
                holder: holder.clone(),
                kind,
            },
        );

        info!(credential_id = id, holder = %holder, kind = %kind, "Issued credential");
        Ok(id)
    }

    /// Revoke a credential (issuer only)
    pub fn revoke_credential(&self, caller: &Identity, id: CredentialId) -> Result<()> {
        if caller != &self.issuer {
            return Err(LedgerError::NotIssuer);
        }

        let mut state = self.state.write().unwrap();
        let now = self.clock.now();
        {
            let credential = state
                .credentials
                .get_mut(&id)
                .ok_or(LedgerError::NotFound {
                    entity: "credential",
                    id,
                })?;
            credential.active = false;
        }
        state.record(now, EventKind::CredentialRevoked { credential_id: id });

        info!(credential_id = id, "Revoked credential");
        Ok(())
    }

    /// Reactivate a previously revoked credential (issuer only)
    pub fn reactivate_credential(&self, caller: &Identity, id: CredentialId) -> Result<()> {
        if caller != &self.issuer {
            return Err(LedgerError::NotIssuer);
        }

        let mut state = self.state.write().unwrap();
        let now = self.clock.now();
        {
            let credential = state
                .credentials
                .get_mut(&id)
                .ok_or(LedgerError::NotFound {
                    entity: "credential",
                    id,
                })?;
            credential.active = true;
        }
        state.record(now, EventKind::CredentialReactivated { credential_id: id });

        info!(credential_id = id, "Reactivated credential");
        Ok(())
    }

    /// Validity predicate: active and unexpired; false for unknown ids
    pub fn is_credential_valid(&self, id: CredentialId) -> bool {
        let state = self.state.read().unwrap();
        let now = self.clock.now();
        state
            .credentials
            .get(&id)
            .map(|c| c.is_valid(now))
            .unwrap_or(false)
    }

    /// Whether `holder` currently holds a valid credential of `kind`
    pub fn has_valid_credential(&self, holder: &Identity, kind: CredentialKind) -> bool {
        let state = self.state.read().unwrap();
        let now = self.clock.now();
        state
            .holders
            .get(holder)
            .and_then(|id| state.credentials.get(id))
            .map(|c| c.is_valid(now) && c.kind == kind)
            .unwrap_or(false)
    }

    /// Fetch a credential record
    pub fn credential(&self, id: CredentialId) -> Option<Credential> {
        self.state.read().unwrap().credentials.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;

    fn issuer() -> Identity {
        Identity::custom("medical-board")
    }

    fn test_ledger(clock: Arc<ManualClock>) -> Ledger {
        Ledger::with_clock(
            issuer(),
            vec![Identity::oidc("signer-1"), Identity::oidc("signer-2")],
            2,
            clock,
        )
        .unwrap()
    }

    fn issue(ledger: &Ledger, holder: &str, kind: CredentialKind) -> CredentialId {
        ledger
            .issue_credential(
                &issuer(),
                Identity::oidc(holder),
                kind,
                Commitment::digest(holder.as_bytes()),
                "ophthalmology",
                "bafy-cred",
                Duration::days(365),
            )
            .unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);

        let id = issue(&ledger, "dr-osei", CredentialKind::Prescriber);
        assert_eq!(id, 1);
        assert!(ledger.is_credential_valid(id));
        assert!(ledger.has_valid_credential(&Identity::oidc("dr-osei"), CredentialKind::Prescriber));
        assert!(!ledger.has_valid_credential(&Identity::oidc("dr-osei"), CredentialKind::Pharmacist));
    }

    #[test]
    fn test_only_issuer_can_issue() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);

        let result = ledger.issue_credential(
            &Identity::oidc("not-the-board"),
            Identity::oidc("dr-osei"),
            CredentialKind::Prescriber,
            Commitment::digest(b"license"),
            "general",
            "bafy-cred",
            Duration::days(365),
        );
        assert_eq!(result, Err(LedgerError::NotIssuer));
    }

    #[test]
    fn test_duplicate_holder_rejected_even_after_revoke() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);

        let id = issue(&ledger, "dr-osei", CredentialKind::Prescriber);
        ledger.revoke_credential(&issuer(), id).unwrap();

        let result = ledger.issue_credential(
            &issuer(),
            Identity::oidc("dr-osei"),
            CredentialKind::Prescriber,
            Commitment::digest(b"new license"),
            "general",
            "bafy-cred-2",
            Duration::days(365),
        );
        assert_eq!(
            result,
            Err(LedgerError::DuplicateHolder(Identity::oidc("dr-osei")))
        );
    }

    #[test]
    fn test_input_validation() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);

        let empty_commitment = Commitment::from_bytes(Vec::new());
        let result = ledger.issue_credential(
            &issuer(),
            Identity::oidc("dr-osei"),
            CredentialKind::Prescriber,
            empty_commitment,
            "general",
            "bafy-cred",
            Duration::days(365),
        );
        assert_eq!(result, Err(LedgerError::InvalidLicense));

        let result = ledger.issue_credential(
            &issuer(),
            Identity::oidc("dr-osei"),
            CredentialKind::Prescriber,
            Commitment::digest(b"license"),
            "general",
            "",
            Duration::days(365),
        );
        assert_eq!(result, Err(LedgerError::InvalidMetadata));

        let result = ledger.issue_credential(
            &issuer(),
            Identity::oidc("dr-osei"),
            CredentialKind::Prescriber,
            Commitment::digest(b"license"),
            "general",
            "bafy-cred",
            Duration::zero(),
        );
        assert_eq!(result, Err(LedgerError::InvalidValidity));
    }

    #[test]
    fn test_revoke_and_reactivate() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);
        let id = issue(&ledger, "dr-osei", CredentialKind::Prescriber);

        ledger.revoke_credential(&issuer(), id).unwrap();
        assert!(!ledger.is_credential_valid(id));

        ledger.reactivate_credential(&issuer(), id).unwrap();
        assert!(ledger.is_credential_valid(id));
    }

    #[test]
    fn test_revoke_unknown_id() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);

        let result = ledger.revoke_credential(&issuer(), 42);
        assert_eq!(
            result,
            Err(LedgerError::NotFound {
                entity: "credential",
                id: 42
            })
        );
    }

    #[test]
    fn test_validity_expires_with_clock() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock.clone());
        let id = issue(&ledger, "dr-osei", CredentialKind::Prescriber);

        clock.advance(Duration::days(366));
        assert!(!ledger.is_credential_valid(id));
        assert!(
            !ledger.has_valid_credential(&Identity::oidc("dr-osei"), CredentialKind::Prescriber)
        );
    }

    #[test]
    fn test_unknown_id_is_invalid_not_an_error() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);
        assert!(!ledger.is_credential_valid(999));
    }

    #[test]
    fn test_sequential_ids() {
        let clock = Arc::new(ManualClock::new());
        let ledger = test_ledger(clock);

        assert_eq!(issue(&ledger, "dr-osei", CredentialKind::Prescriber), 1);
        assert_eq!(issue(&ledger, "ph-mensah", CredentialKind::Pharmacist), 2);
        assert_eq!(ledger.credential_count(), 2);
    }
}
