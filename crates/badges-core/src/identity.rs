//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all protocol identifiers. These prevent accidental
//! identifier confusion — you cannot pass a `RaftTokenId` where a
//! `CredentialId` is expected, and an `Address` is never a bare string.
//!
//! ## Security Invariant
//!
//! Type-level distinction between identifier namespaces prevents
//! cross-namespace confusion where one kind of identifier is substituted
//! for another in an authorization check.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::digest::ContentDigest;
use crate::error::CoreError;

/// A 20-byte account address.
///
/// Derived from an Ed25519 public key as the trailing 20 bytes of
/// `SHA-256(public key)`. Serializes as a `0x`-prefixed lowercase hex
/// string for JSON interoperability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

/// Unique identifier for an authority (raft) token.
///
/// Assigned by the authority registry's monotonic counter, starting at 1.
/// Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RaftTokenId(pub u64);

/// The unique key of a credential specification: an opaque URI string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecUri(String);

/// Unique identifier for a minted credential.
///
/// Derived deterministically from the canonical claim digest rather than a
/// counter, so re-minting the same claim collides to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CredentialId([u8; 32]);

// ---------------------------------------------------------------------------
// Address impls
// ---------------------------------------------------------------------------

impl Address {
    /// Create an address from raw 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive an address from raw Ed25519 public key bytes.
    ///
    /// The address is the trailing 20 bytes of `SHA-256(public key)`.
    pub fn from_public_key_bytes(public_key: &[u8; 32]) -> Self {
        let hash = Sha256::digest(public_key);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Self(out)
    }

    /// Return the raw 20-byte address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render the address as a `0x`-prefixed lowercase hex string.
    pub fn to_hex(&self) -> String {
        let body: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{body}")
    }

    /// Parse an address from a `0x`-prefixed 40-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let hex = hex.trim().to_lowercase();
        let body = hex
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::InvalidIdentifier(format!("address must start with 0x: {hex:?}")))?;
        if body.len() != 40 {
            return Err(CoreError::InvalidIdentifier(format!(
                "address hex must be 40 chars, got {}",
                body.len()
            )));
        }
        let mut out = [0u8; 20];
        for (i, chunk) in body.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| CoreError::InvalidIdentifier(format!("invalid hex: {e}")))?;
            out[i] = u8::from_str_radix(s, 16)
                .map_err(|e| CoreError::InvalidIdentifier(format!("invalid hex at {i}: {e}")))?;
        }
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// RaftTokenId impls
// ---------------------------------------------------------------------------

impl RaftTokenId {
    /// Access the inner token number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RaftTokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raft:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SpecUri impls
// ---------------------------------------------------------------------------

impl SpecUri {
    /// Create a spec URI, rejecting empty strings.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        if uri.is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "spec uri must not be empty".to_string(),
            ));
        }
        Ok(Self(uri))
    }

    /// Access the URI string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpecUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// CredentialId impls
// ---------------------------------------------------------------------------

impl CredentialId {
    /// Derive a credential id from a content digest.
    ///
    /// The id IS the digest bytes — identical claims always map to the
    /// same id, which is the protocol's replay and double-mint defense.
    pub fn from_digest(digest: ContentDigest) -> Self {
        Self(*digest.as_bytes())
    }

    /// Return the raw 32-byte id.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the id as a `0x`-prefixed lowercase hex string.
    pub fn to_hex(&self) -> String {
        let body: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{body}")
    }
}

impl Serialize for CredentialId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CredentialId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        let body = hex.strip_prefix("0x").ok_or_else(|| {
            serde::de::Error::custom(format!("credential id must start with 0x: {hex:?}"))
        })?;
        let digest = ContentDigest::from_hex(body).map_err(serde::de::Error::custom)?;
        Ok(Self::from_digest(digest))
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
