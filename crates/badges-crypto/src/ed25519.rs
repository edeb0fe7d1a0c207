//! # Ed25519 Signing and the Compact Signature Envelope
//!
//! Provides Ed25519 key generation, signing, and verification for agreement
//! digests, plus [`CompactSignature`] — the packed fixed-width envelope that
//! off-chain signers hand to on-chain callers.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be a `ContentDigest`. Digests are only producible
//!   from `CanonicalBytes`, so every signature in the system covers
//!   canonicalized input.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize` or expose the private key bytes.
//! - [`CompactSignature::check()`] treats every malformed input — wrong
//!   length, invalid public key bytes, corrupt signature — as a
//!   verification failure, never a panic.
//!
//! ## Serde
//!
//! Public keys, signatures, and compact envelopes serialize as hex-encoded
//! strings.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use badges_core::error::CryptoError;
use badges_core::{Address, ContentDigest};

/// An Ed25519 public key (32 bytes) for signature verification.
///
/// Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
///
/// Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize` — private keys must not be accidentally
/// serialized into logs, responses, or artifacts.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

/// The packed fixed-width signature envelope: `public key || signature`,
/// 96 bytes total.
///
/// Ed25519 has no signer recovery, so the envelope carries the signer's
/// public key; "recovering the signer" is deriving the [`Address`] from the
/// embedded key. Callers compare that derived address against the party the
/// protocol expects to have signed.
#[derive(Clone, PartialEq, Eq)]
pub struct CompactSignature {
    public_key: Ed25519PublicKey,
    signature: Ed25519Signature,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive the account address for this key.
    pub fn address(&self) -> Address {
        Address::from_public_key_bytes(&self.0)
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(hex, 64).map_err(CryptoError::KeyError)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey` for verification.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(hex, 128).map_err(CryptoError::VerificationFailed)?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte private key seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key from this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Derive the account address for this key pair.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign an agreement digest.
    ///
    /// The input is a `ContentDigest`, producible only from canonical
    /// bytes, so signatures always cover canonicalized input.
    pub fn sign_digest(&self, digest: &ContentDigest) -> Ed25519Signature {
        let sig = self.signing_key.sign(digest.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }

    /// Sign a digest and wrap the result in a compact envelope.
    pub fn sign_compact(&self, digest: &ContentDigest) -> CompactSignature {
        CompactSignature {
            public_key: self.public_key(),
            signature: self.sign_digest(digest),
        }
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over an agreement digest.
///
/// Returns `Ok(())` if valid, `Err(CryptoError::VerificationFailed)`
/// otherwise.
pub fn verify(
    digest: &ContentDigest,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(digest.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

// ---------------------------------------------------------------------------
// CompactSignature impls
// ---------------------------------------------------------------------------

impl CompactSignature {
    /// Assemble an envelope from its parts.
    pub fn new(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    /// The signer's public key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    /// The account address derived from the embedded public key.
    pub fn signer_address(&self) -> Address {
        self.public_key.address()
    }

    /// Pack the envelope into its 96-byte wire form: `public key || signature`.
    pub fn to_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[..32].copy_from_slice(&self.public_key.0);
        out[32..].copy_from_slice(&self.signature.0);
        out
    }

    /// Parse an envelope from packed bytes.
    ///
    /// Any length other than 96 bytes is a `VerificationFailed` error —
    /// garbage input must fail gracefully, not crash.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 96 {
            return Err(CryptoError::VerificationFailed(format!(
                "compact signature must be 96 bytes, got {}",
                bytes.len()
            )));
        }
        let mut pk = [0u8; 32];
        pk.copy_from_slice(&bytes[..32]);
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&bytes[32..]);
        Ok(Self {
            public_key: Ed25519PublicKey(pk),
            signature: Ed25519Signature(sig),
        })
    }

    /// Render the envelope as a 192-character hex string.
    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse an envelope from a 192-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(hex, 192).map_err(CryptoError::VerificationFailed)?;
        Self::from_bytes(&bytes)
    }

    /// Check this envelope against an expected signer and digest.
    ///
    /// Fails with `VerificationFailed` when the derived signer address does
    /// not match `expected`, when the embedded public key is not a valid
    /// curve point, or when the signature does not verify over the digest.
    pub fn check(&self, expected: Address, digest: &ContentDigest) -> Result<(), CryptoError> {
        let signer = self.signer_address();
        if signer != expected {
            return Err(CryptoError::VerificationFailed(format!(
                "recovered signer {signer} does not match expected {expected}"
            )));
        }
        verify(digest, &self.signature, &self.public_key)
    }
}

impl Serialize for CompactSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CompactSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for CompactSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompactSignature(signer={})", self.signer_address())
    }
}

// ---------------------------------------------------------------------------
// Hex utilities (no external hex crate dependency)
// ---------------------------------------------------------------------------

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

fn hex_to_bytes(hex: &str, expected_len: usize) -> Result<Vec<u8>, String> {
    let hex = hex.trim().to_lowercase();
    if hex.len() != expected_len {
        return Err(format!(
            "hex string must be {expected_len} chars, got {}",
            hex.len()
        ));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}
