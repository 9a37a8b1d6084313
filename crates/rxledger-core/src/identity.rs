//! Caller identity types
//!
//! The ledger receives already-authenticated identities. Resolving a raw
//! bearer token or signature to an `Identity` is the service boundary's job
//! (see the `auth` module in `rxledger-service`); nothing in the core ever
//! parses a token.

use serde::{Deserialize, Serialize};

/// An already-resolved caller identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// How the identity was established (oidc, did, apikey, custom)
    pub scheme: IdentityScheme,

    /// Identity value (e.g. "https://idp.example/users/dr-osei")
    pub value: String,
}

/// Schemes under which an identity can be established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityScheme {
    /// OpenID Connect / OAuth2
    Oidc,
    /// Decentralized Identifier
    Did,
    /// API Key
    ApiKey,
    /// Custom identifier
    Custom,
}

impl Identity {
    /// Create a new identity
    pub fn new(scheme: IdentityScheme, value: impl Into<String>) -> Self {
        Self {
            scheme,
            value: value.into(),
        }
    }

    /// Create an OIDC identity
    pub fn oidc(value: impl Into<String>) -> Self {
        Self::new(IdentityScheme::Oidc, value)
    }

    /// Create a DID identity
    pub fn did(value: impl Into<String>) -> Self {
        Self::new(IdentityScheme::Did, value)
    }

    /// Create an API-key identity
    pub fn api_key(value: impl Into<String>) -> Self {
        Self::new(IdentityScheme::ApiKey, value)
    }

    /// Create a custom identity
    pub fn custom(value: impl Into<String>) -> Self {
        Self::new(IdentityScheme::Custom, value)
    }

    /// Parse "scheme:value"; an unrecognized or missing scheme prefix yields
    /// a custom identity over the whole string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some(("oidc", value)) => Identity::oidc(value),
            Some(("did", value)) => Identity::did(value),
            Some(("apikey", value)) => Identity::api_key(value),
            Some(("custom", value)) => Identity::custom(value),
            _ => Identity::custom(s),
        }
    }
}

impl std::fmt::Display for IdentityScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityScheme::Oidc => write!(f, "oidc"),
            IdentityScheme::Did => write!(f, "did"),
            IdentityScheme::ApiKey => write!(f, "apikey"),
            IdentityScheme::Custom => write!(f, "custom"),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scheme, self.value)
    }
}

impl std::str::FromStr for Identity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Identity::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let identity = Identity::oidc("https://idp.example/users/dr-osei");
        assert_eq!(
            identity.to_string(),
            "oidc:https://idp.example/users/dr-osei"
        );
    }

    #[test]
    fn test_identity_parse_roundtrip() {
        let identity: Identity = "did:example:123456".parse().unwrap();
        assert_eq!(identity.scheme, IdentityScheme::Did);
        assert_eq!(identity.value, "example:123456");
        assert_eq!(identity.to_string(), "did:example:123456");
    }

    #[test]
    fn test_identity_parse_unrecognized_scheme_is_custom() {
        let identity: Identity = "pharmacy-7".parse().unwrap();
        assert_eq!(identity.scheme, IdentityScheme::Custom);
        assert_eq!(identity.value, "pharmacy-7");
    }

    #[test]
    fn test_identity_equality_keys_maps() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Identity::oidc("alice"));
        assert!(set.contains(&Identity::oidc("alice")));
        assert!(!set.contains(&Identity::custom("alice")));
    }
}
