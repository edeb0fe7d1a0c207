//! # badges-crypto — Cryptographic Primitives for the Badge Protocol
//!
//! This crate provides the cryptographic building blocks used by the
//! agreement and registry layers:
//!
//! - **Ed25519** signing and verification for agreement digests, plus the
//!   compact signature envelope (packed `public key || signature`) that
//!   carries the signer's identity alongside the signature.
//! - **Sorted-pair merkle allowlist tree** with inclusion proofs, used to
//!   commit a batch of pre-approved claimant addresses under a single
//!   signed root.
//!
//! ## Security Invariants
//!
//! - Signing input is always a [`ContentDigest`](badges_core::ContentDigest),
//!   which can itself only be produced from `CanonicalBytes` — the
//!   canonicalization pipeline is preserved end to end.
//! - Private keys are never serialized or logged.
//! - Malformed signature envelopes and proofs fail verification; they never
//!   panic.

pub mod ed25519;
pub mod merkle;

// Re-export primary types.
pub use ed25519::{CompactSignature, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use merkle::{leaf_hash, verify_proof, AllowlistTree, LeafHash, MerkleProof, MerkleRoot};
