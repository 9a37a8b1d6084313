//! Multi-signer admin actions
//!
//! Privileged operations — signer-set changes, audit-trail disclosure — are
//! never executable by a single actor. An action is proposed by one signer,
//! approved by further distinct signers, and executed explicitly once the
//! approval count reaches the configured threshold. Reaching the threshold
//! does not execute anything on its own.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::CredentialId;
use crate::identity::Identity;

/// Sequential action nonce, starting at 1
pub type ActionNonce = u64;

/// Kinds of privileged action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionKind {
    /// Add an identity to the signer set
    AddSigner,
    /// Remove an identity from the signer set
    RemoveSigner,
    /// Disclose a credential's prescription audit trails
    DiscloseAuditTrail,
}

impl std::fmt::Display for AdminActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminActionKind::AddSigner => write!(f, "add_signer"),
            AdminActionKind::RemoveSigner => write!(f, "remove_signer"),
            AdminActionKind::DiscloseAuditTrail => write!(f, "disclose_audit_trail"),
        }
    }
}

/// A privileged action moving through propose → approve → execute
///
/// Approvals have set semantics: an identity appears at most once, and a
/// repeat approval is an error the caller can detect, not a silent no-op.
/// Once `executed` flips true the action is immutable.
#[derive(Debug, Clone, Serialize)]
pub struct AdminAction {
    /// Sequential nonce identifying this action
    pub nonce: ActionNonce,

    /// What executing this action will do
    pub kind: AdminActionKind,

    /// Opaque payload, parsed only at execution (see the codec helpers below)
    pub payload: Vec<u8>,

    /// Distinct signers who have approved, proposer included
    pub approvals: HashSet<Identity>,

    /// True once executed; terminal
    pub executed: bool,

    /// Signer who proposed the action
    pub proposed_by: Identity,

    /// When the action was proposed
    pub proposed_at: DateTime<Utc>,
}

/// Payload for [`AdminActionKind::DiscloseAuditTrail`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrailRequest {
    /// Credential whose trails are to be disclosed
    pub credential_id: CredentialId,
}

/// Encode a signer identity as an add/remove-signer payload
pub fn encode_signer_payload(identity: &Identity) -> Vec<u8> {
    // Identity serialization is infallible: two enum-tagged strings
    serde_json::to_vec(identity).unwrap_or_default()
}

/// Decode an add/remove-signer payload back to the identity
pub fn decode_signer_payload(payload: &[u8]) -> Result<Identity, serde_json::Error> {
    serde_json::from_slice(payload)
}

impl AuditTrailRequest {
    /// Encode as a disclose-audit-trail payload
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode a disclose-audit-trail payload
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_payload_roundtrip() {
        let signer = Identity::oidc("board-member-2");
        let payload = encode_signer_payload(&signer);
        assert_eq!(decode_signer_payload(&payload).unwrap(), signer);
    }

    #[test]
    fn test_audit_request_roundtrip() {
        let request = AuditTrailRequest { credential_id: 7 };
        assert_eq!(AuditTrailRequest::decode(&request.encode()).unwrap(), request);
    }

    #[test]
    fn test_garbage_payload_rejected() {
        assert!(decode_signer_payload(b"not json").is_err());
        assert!(AuditTrailRequest::decode(b"{}").is_err());
    }

    #[test]
    fn test_approvals_are_a_set() {
        let proposer = Identity::oidc("board-member-1");
        let mut action = AdminAction {
            nonce: 1,
            kind: AdminActionKind::AddSigner,
            payload: Vec::new(),
            approvals: HashSet::from([proposer.clone()]),
            executed: false,
            proposed_by: proposer.clone(),
            proposed_at: Utc::now(),
        };

        // Re-inserting the proposer does not grow the set
        action.approvals.insert(proposer);
        assert_eq!(action.approvals.len(), 1);
    }
}
