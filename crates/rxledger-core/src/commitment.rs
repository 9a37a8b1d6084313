//! Commitment and capability-secret primitives
//!
//! A `Commitment` is a one-way hash over caller-side data (patient identity,
//! prescription payload, license document). The ledger never inverts or
//! interprets one; it stores commitments at creation and later compares
//! presented values byte-for-byte. Canonical encoding of the committed
//! fields — order, separators — is fixed by caller convention.
//!
//! An `AccessSecret` is the bearer capability returned once at prescription
//! creation. It is random, never derivable from the stored record, and its
//! `Debug` form is redacted so it cannot leak through logs.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Opaque one-way commitment over caller-side data
///
/// Equality is exact-byte; two commitments are interchangeable only if their
/// bytes are identical. The text form (serde, `Display`) is lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Commitment(Vec<u8>);

impl Commitment {
    /// Commit to raw input bytes (SHA-256)
    pub fn digest(data: impl AsRef<[u8]>) -> Self {
        Self(Sha256::digest(data.as_ref()).to_vec())
    }

    /// Wrap already-computed commitment bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a commitment from its hex text form
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }

    /// Raw commitment bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex text form
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// An empty commitment commits to nothing and is rejected by the ledger
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Commitment::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Capability token granting out-of-band access to a prescription's details
///
/// Generated once at creation from the OS random source and returned to the
/// caller; the ledger keeps a copy only to check later presentations.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessSecret(String);

/// Random bytes per secret; 256 bits makes collisions and guessing negligible
const SECRET_LEN: usize = 32;

impl AccessSecret {
    /// Generate a fresh random secret
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let mut bytes = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Check a presented secret against this one
    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented
    }

    /// The secret itself — hand to the creating caller once, never log
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessSecret").field(&"[redacted]").finish()
    }
}
