//! Professional credential records
//!
//! A credential binds an identity to a role with an expiry. Records are
//! append-only: revocation and reactivation flip `active`, nothing is ever
//! deleted, and no operation reassigns `holder` — non-transferability is the
//! absence of any such API, not a guarded code path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;
use crate::identity::Identity;

/// Sequential credential identifier, starting at 1
pub type CredentialId = u64;

/// Role a credential authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// May create and cancel prescriptions
    Prescriber,
    /// May dispense prescriptions
    Pharmacist,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::Prescriber => write!(f, "prescriber"),
            CredentialKind::Pharmacist => write!(f, "pharmacist"),
        }
    }
}

impl std::str::FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prescriber" => Ok(CredentialKind::Prescriber),
            "pharmacist" => Ok(CredentialKind::Pharmacist),
            _ => Err(format!("Unknown credential kind: {}", s)),
        }
    }
}

/// A non-transferable professional credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Sequential identifier
    pub id: CredentialId,

    /// The identity this credential is bound to, unique across all records
    pub holder: Identity,

    /// Role the credential authorizes
    pub kind: CredentialKind,

    /// Commitment to the holder's license document
    pub license_commitment: Commitment,

    /// Free-text specialty (e.g. "ophthalmology")
    pub specialty: String,

    /// Opaque pointer to off-ledger credential metadata (content address)
    pub metadata_ref: String,

    /// When the credential was issued
    pub issued_at: DateTime<Utc>,

    /// When the credential expires
    pub expires_at: DateTime<Utc>,

    /// False after revocation, true again after reactivation
    pub active: bool,
}

impl Credential {
    /// Validity predicate: active and not yet expired
    ///
    /// Kind-gated operations additionally require the right `kind`; a valid
    /// pharmacist credential does not authorize prescribing.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential(active: bool, expires_in: Duration) -> Credential {
        let now = Utc::now();
        Credential {
            id: 1,
            holder: Identity::oidc("dr-osei"),
            kind: CredentialKind::Prescriber,
            license_commitment: Commitment::digest(b"license"),
            specialty: "ophthalmology".into(),
            metadata_ref: "bafy-credential-1".into(),
            issued_at: now,
            expires_at: now + expires_in,
            active,
        }
    }

    #[test]
    fn test_active_unexpired_is_valid() {
        let cred = credential(true, Duration::days(365));
        assert!(cred.is_valid(Utc::now()));
    }

    #[test]
    fn test_revoked_is_invalid() {
        let cred = credential(false, Duration::days(365));
        assert!(!cred.is_valid(Utc::now()));
    }

    #[test]
    fn test_expired_is_invalid_even_if_active() {
        let cred = credential(true, Duration::days(30));
        let later = Utc::now() + Duration::days(31);
        assert!(!cred.is_valid(later));
    }

    #[test]
    fn test_validity_boundary_is_exclusive() {
        let cred = credential(true, Duration::days(30));
        // now < expires_at, so exactly-at-expiry is invalid
        assert!(!cred.is_valid(cred.expires_at));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "prescriber".parse::<CredentialKind>().unwrap(),
            CredentialKind::Prescriber
        );
        assert_eq!(
            "Pharmacist".parse::<CredentialKind>().unwrap(),
            CredentialKind::Pharmacist
        );
        assert!("nurse".parse::<CredentialKind>().is_err());
    }
}
