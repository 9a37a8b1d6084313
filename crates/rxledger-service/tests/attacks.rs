//! Attack Scenario Tests
//!
//! These tests verify that specific attack patterns are prevented by the
//! ledger's invariants. Each test represents a real-world attack scenario
//! that must be blocked, and blocked without any partial state change.

use std::sync::Arc;

use chrono::Duration;
use rxledger_core::{
    Commitment, CredentialKind, Identity, LedgerError, PrescriptionStatus,
};
use rxledger_service::{Ledger, ManualClock};

// =============================================================================
// Test Helpers
// =============================================================================

fn issuer() -> Identity {
    Identity::custom("medical-board")
}

fn setup() -> (Arc<ManualClock>, Ledger) {
    let clock = Arc::new(ManualClock::new());
    let ledger = Ledger::with_clock(
        issuer(),
        vec![Identity::oidc("signer-1"), Identity::oidc("signer-2")],
        2,
        clock.clone(),
    )
    .unwrap();

    ledger
        .issue_credential(
            &issuer(),
            Identity::oidc("dr-osei"),
            CredentialKind::Prescriber,
            Commitment::digest(b"license-osei"),
            "general",
            "bafy-cred-1",
            Duration::days(365),
        )
        .unwrap();
    ledger
        .issue_credential(
            &issuer(),
            Identity::oidc("ph-mensah"),
            CredentialKind::Pharmacist,
            Commitment::digest(b"license-mensah"),
            "retail pharmacy",
            "bafy-cred-2",
            Duration::days(365),
        )
        .unwrap();

    (clock, ledger)
}

fn create_rx(ledger: &Ledger) -> u64 {
    let (rx, _secret) = ledger
        .create_prescription(
            &Identity::oidc("dr-osei"),
            Commitment::digest(b"patient-record"),
            Commitment::digest(b"rx-payload"),
            "bafy-rx",
            30,
        )
        .unwrap();
    rx
}

// =============================================================================
// ATTACK: Forged Dispense Data
// =============================================================================

/// A pharmacist (or someone holding a stolen pharmacist token) presents a
/// different patient than the one the prescription was written for.
///
/// The ledger compares the presented patient commitment byte-for-byte
/// against the stored one and reports the mismatch as a distinct tamper
/// error, with no state change.
#[test]
fn attack_substituted_patient_blocked() {
    let (_clock, ledger) = setup();
    let rx = create_rx(&ledger);

    let result = ledger.dispense_prescription(
        rx,
        &Commitment::digest(b"a different patient"),
        &Commitment::digest(b"rx-payload"),
        &Identity::oidc("ph-mensah"),
    );
    assert!(matches!(result, Err(LedgerError::PatientMismatch { .. })));

    // Still active, still dispensable by the honest path
    assert_eq!(
        ledger.batch_status(&[rx]),
        vec![Some(PrescriptionStatus::Active)]
    );
    assert!(ledger.is_dispensable(rx));
}

/// Same attack on the payload: the drug list was altered in transit.
#[test]
fn attack_altered_payload_blocked() {
    let (_clock, ledger) = setup();
    let rx = create_rx(&ledger);

    let result = ledger.dispense_prescription(
        rx,
        &Commitment::digest(b"patient-record"),
        &Commitment::digest(b"rx-payload plus extra opioids"),
        &Identity::oidc("ph-mensah"),
    );
    assert!(matches!(result, Err(LedgerError::PayloadMismatch { .. })));
    assert!(ledger.is_dispensable(rx));
}

/// The two mismatches are reported distinctly so forensic logs can tell
/// which field was forged.
#[test]
fn attack_mismatch_errors_are_distinct() {
    let (_clock, ledger) = setup();
    let rx = create_rx(&ledger);
    let wrong = Commitment::digest(b"wrong");

    let patient_err = ledger
        .dispense_prescription(
            rx,
            &wrong,
            &Commitment::digest(b"rx-payload"),
            &Identity::oidc("ph-mensah"),
        )
        .unwrap_err();
    let payload_err = ledger
        .dispense_prescription(
            rx,
            &Commitment::digest(b"patient-record"),
            &wrong,
            &Identity::oidc("ph-mensah"),
        )
        .unwrap_err();

    assert!(matches!(patient_err, LedgerError::PatientMismatch { .. }));
    assert!(matches!(payload_err, LedgerError::PayloadMismatch { .. }));
}

// =============================================================================
// ATTACK: Double Dispense
// =============================================================================

/// Two pharmacies race to fill the same prescription. Exactly one wins; the
/// second gets a state conflict, never a silent success.
#[test]
fn attack_double_dispense_blocked() {
    let (_clock, ledger) = setup();
    ledger
        .issue_credential(
            &issuer(),
            Identity::oidc("ph-boateng"),
            CredentialKind::Pharmacist,
            Commitment::digest(b"license-boateng"),
            "hospital pharmacy",
            "bafy-cred-3",
            Duration::days(365),
        )
        .unwrap();
    let rx = create_rx(&ledger);

    let patient = Commitment::digest(b"patient-record");
    let payload = Commitment::digest(b"rx-payload");

    ledger
        .dispense_prescription(rx, &patient, &payload, &Identity::oidc("ph-mensah"))
        .unwrap();
    let result =
        ledger.dispense_prescription(rx, &patient, &payload, &Identity::oidc("ph-boateng"));
    assert_eq!(
        result,
        Err(LedgerError::NotActive(PrescriptionStatus::Dispensed))
    );

    // The winning pharmacist is the one on record
    let events = ledger.events();
    let dispensed = events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                rxledger_service::EventKind::PrescriptionDispensed { .. }
            )
        })
        .count();
    assert_eq!(dispensed, 1);
}

// =============================================================================
// ATTACK: Credential Misuse
// =============================================================================

/// A pharmacist tries to write prescriptions with a pharmacist credential.
#[test]
fn attack_wrong_kind_cannot_prescribe() {
    let (_clock, ledger) = setup();

    let result = ledger.create_prescription(
        &Identity::oidc("ph-mensah"),
        Commitment::digest(b"patient-record"),
        Commitment::digest(b"rx-payload"),
        "bafy-rx",
        30,
    );
    assert!(matches!(
        result,
        Err(LedgerError::InvalidCredential { .. })
    ));
}

/// A prescriber tries to dispense their own prescription.
#[test]
fn attack_prescriber_cannot_self_dispense() {
    let (_clock, ledger) = setup();
    let rx = create_rx(&ledger);

    let result = ledger.dispense_prescription(
        rx,
        &Commitment::digest(b"patient-record"),
        &Commitment::digest(b"rx-payload"),
        &Identity::oidc("dr-osei"),
    );
    assert!(matches!(
        result,
        Err(LedgerError::InvalidCredential { .. })
    ));
}

/// A revoked pharmacist keeps presenting their old credential.
#[test]
fn attack_revoked_pharmacist_cannot_dispense() {
    let (_clock, ledger) = setup();
    let rx = create_rx(&ledger);

    // Pharmacist credential is id 2
    ledger.revoke_credential(&issuer(), 2).unwrap();

    let result = ledger.dispense_prescription(
        rx,
        &Commitment::digest(b"patient-record"),
        &Commitment::digest(b"rx-payload"),
        &Identity::oidc("ph-mensah"),
    );
    assert!(matches!(
        result,
        Err(LedgerError::InvalidCredential { .. })
    ));
}

/// Someone with no credential record at all.
#[test]
fn attack_uncredentialed_caller_blocked() {
    let (_clock, ledger) = setup();
    let rx = create_rx(&ledger);
    let stranger = Identity::oidc("stranger");

    let result = ledger.dispense_prescription(
        rx,
        &Commitment::digest(b"patient-record"),
        &Commitment::digest(b"rx-payload"),
        &stranger,
    );
    assert_eq!(result, Err(LedgerError::NoCredential(stranger)));
}

// =============================================================================
// ATTACK: Unauthorized Cancellation
// =============================================================================

/// Only the original prescriber can cancel; the dispensing pharmacist, other
/// prescribers and strangers are all rejected.
#[test]
fn attack_cancel_by_non_creator_blocked() {
    let (_clock, ledger) = setup();
    ledger
        .issue_credential(
            &issuer(),
            Identity::oidc("dr-adjei"),
            CredentialKind::Prescriber,
            Commitment::digest(b"license-adjei"),
            "cardiology",
            "bafy-cred-3",
            Duration::days(365),
        )
        .unwrap();
    let rx = create_rx(&ledger);

    for caller in [
        Identity::oidc("ph-mensah"),
        Identity::oidc("dr-adjei"),
        Identity::oidc("stranger"),
    ] {
        let result = ledger.cancel_prescription(rx, &caller, "hostile cancel");
        assert_eq!(result, Err(LedgerError::NotPrescriber), "caller {}", caller);
    }

    assert!(ledger.is_dispensable(rx));
}

// =============================================================================
// ATTACK: Capability Secret Guessing
// =============================================================================

/// Detail reads require the exact secret returned at creation; near misses
/// and other prescriptions' secrets fail.
#[test]
fn attack_forged_access_secret_blocked() {
    let (_clock, ledger) = setup();
    let (rx1, secret1) = ledger
        .create_prescription(
            &Identity::oidc("dr-osei"),
            Commitment::digest(b"patient-record"),
            Commitment::digest(b"rx-payload"),
            "bafy-rx-1",
            30,
        )
        .unwrap();
    let (rx2, secret2) = ledger
        .create_prescription(
            &Identity::oidc("dr-osei"),
            Commitment::digest(b"patient-record"),
            Commitment::digest(b"rx-payload"),
            "bafy-rx-2",
            30,
        )
        .unwrap();

    // Cross-prescription replay fails
    assert_eq!(
        ledger.prescription_details(rx1, secret2.expose()),
        Err(LedgerError::InvalidSecret)
    );
    assert_eq!(
        ledger.prescription_details(rx2, secret1.expose()),
        Err(LedgerError::InvalidSecret)
    );

    // Truncated secret fails
    let truncated = &secret1.expose()[..secret1.expose().len() - 1];
    assert_eq!(
        ledger.prescription_details(rx1, truncated),
        Err(LedgerError::InvalidSecret)
    );
}

// =============================================================================
// ATTACK: Issuer Impersonation
// =============================================================================

/// Only the configured issuer identity can mint or revoke credentials.
#[test]
fn attack_issuer_impersonation_blocked() {
    let (_clock, ledger) = setup();
    let impostor = Identity::oidc("fake-board");

    let result = ledger.issue_credential(
        &impostor,
        Identity::oidc("accomplice"),
        CredentialKind::Prescriber,
        Commitment::digest(b"forged license"),
        "general",
        "bafy-cred-x",
        Duration::days(365),
    );
    assert_eq!(result, Err(LedgerError::NotIssuer));

    let result = ledger.revoke_credential(&impostor, 1);
    assert_eq!(result, Err(LedgerError::NotIssuer));
    assert!(ledger.is_credential_valid(1));
}

// =============================================================================
// ATTACK: Credential Laundering
// =============================================================================

/// A holder whose credential was revoked for cause cannot get a fresh record
/// under the same identity — re-issuance requires the prior record to not
/// exist, not merely be inactive.
#[test]
fn attack_credential_laundering_blocked() {
    let (_clock, ledger) = setup();

    ledger.revoke_credential(&issuer(), 1).unwrap();

    let result = ledger.issue_credential(
        &issuer(),
        Identity::oidc("dr-osei"),
        CredentialKind::Prescriber,
        Commitment::digest(b"a brand new license"),
        "general",
        "bafy-cred-fresh",
        Duration::days(365),
    );
    assert_eq!(
        result,
        Err(LedgerError::DuplicateHolder(Identity::oidc("dr-osei")))
    );
}

/// Non-transferability: there is no operation that moves a credential to a
/// new holder, so a new holder means a fresh record under the new identity.
#[test]
fn attack_no_transfer_path_exists() {
    let (_clock, ledger) = setup();

    // The only path: issue a fresh credential to the new identity
    let new_id = ledger
        .issue_credential(
            &issuer(),
            Identity::oidc("dr-owusu"),
            CredentialKind::Prescriber,
            Commitment::digest(b"license-owusu"),
            "general",
            "bafy-cred-4",
            Duration::days(365),
        )
        .unwrap();

    // Both records exist independently; the original holder binding is intact
    assert_eq!(ledger.credential(1).unwrap().holder, Identity::oidc("dr-osei"));
    assert_eq!(
        ledger.credential(new_id).unwrap().holder,
        Identity::oidc("dr-owusu")
    );
}
