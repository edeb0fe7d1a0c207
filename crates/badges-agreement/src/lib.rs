//! # badges-agreement — Typed-Data Agreements
//!
//! The trust anchor of the badge protocol: an issuer (or claimant)
//! constructs a typed payload off-chain, signs its digest, and the minting
//! side recomputes the digest from the submitted parts and checks the
//! signature against the party the protocol expects to have signed.
//!
//! The digest is computed over a canonical envelope
//! `{domain, primaryType, message}`:
//!
//! - `domain` — the [`SigningDomain`] (`name`, `version`, `chainId`,
//!   `verifyingContract`) that scopes signatures to one deployment.
//! - `primaryType` — the payload type name, separating otherwise
//!   identically-shaped payloads into distinct digest domains.
//! - `message` — the typed payload itself.
//!
//! The envelope is serialized through `CanonicalBytes` (RFC 8785) and
//! hashed with SHA-256. Off-chain and on-chain digests are byte-identical
//! because both flow through the same pipeline — this is a strict bit-exact
//! contract, not an approximation.

pub mod domain;
pub mod typed;
pub mod verify;

pub use domain::SigningDomain;
pub use typed::{
    agreement_digest, create_spec_permit_digest, merkle_agreement_digest, request_digest,
    Agreement, CreateSpecPermit, MerkleAgreement, Request,
};
pub use verify::{check_signature, AgreementError};
