//! Identity verification boundary
//!
//! The ledger takes already-resolved identities; this module is where a raw
//! bearer token becomes one. Verifiers are pluggable behind the
//! [`IdentityVerifier`] trait so deployments can swap the static token
//! table for a real IdP integration without touching the ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use rxledger_core::Identity;

/// Errors from token resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// No bearer token was presented
    #[error("Missing bearer token")]
    MissingToken,

    /// Token is not known to this verifier
    #[error("Unrecognized token")]
    UnknownToken,

    /// Token or configuration could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),
}

/// Resolves a bearer token to a caller identity
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a token, or reject it
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    /// Get a description of this verifier (for logging)
    fn description(&self) -> &str {
        "identity verifier"
    }
}

/// Fixed token → identity table from configuration
///
/// Suitable for single-instance deployments where API tokens are provisioned
/// out of band. Tokens are never logged.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    /// Create an empty verifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token binding (builder pattern)
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Parse a `token=identity,token=identity` spec (the
    /// `RXLEDGER_API_TOKENS` format); identities use the `scheme:value`
    /// text form
    pub fn parse_spec(spec: &str) -> Result<Self, AuthError> {
        let mut verifier = Self::new();
        for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
            let (token, identity) = entry.split_once('=').ok_or_else(|| {
                AuthError::Malformed(format!(
                    "Token spec entry must be 'token=identity', got '{}'",
                    entry
                ))
            })?;
            verifier
                .tokens
                .insert(token.trim().to_string(), Identity::parse(identity.trim()));
        }
        Ok(verifier)
    }

    /// Number of registered tokens
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        match self.tokens.get(token) {
            Some(identity) => Ok(identity.clone()),
            None => {
                warn!("Rejected unrecognized bearer token");
                Err(AuthError::UnknownToken)
            }
        }
    }

    fn description(&self) -> &str {
        "static token table"
    }
}

/// Accepts `mock:<name>` tokens, resolving them to custom identities
///
/// For tests and local demos only.
#[derive(Debug, Default)]
pub struct MockVerifier;

#[async_trait]
impl IdentityVerifier for MockVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let name = token
            .strip_prefix("mock:")
            .ok_or(AuthError::UnknownToken)?;
        if name.is_empty() {
            return Err(AuthError::Malformed(
                "Mock token format: 'mock:<name>'".into(),
            ));
        }
        Ok(Identity::custom(name))
    }

    fn description(&self) -> &str {
        "mock verifier"
    }
}
