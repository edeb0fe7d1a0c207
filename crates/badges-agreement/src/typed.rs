//! # Typed Payloads and Digest Computation
//!
//! The four payload types whose signatures drive the protocol:
//!
//! - [`Agreement`] — direct minting. `active` is the party submitting the
//!   on-chain call, `passive` the counterparty whose signature authorizes
//!   it.
//! - [`MerkleAgreement`] — batch minting. The issuer signs once over a
//!   committed allowlist root instead of once per claimant.
//! - [`Request`] — claimant-side consent in dual-signature merkle minting.
//! - [`CreateSpecPermit`] — delegated spec registration: the raft owner
//!   authorizes `to` to register a spec under `raftTokenId`.
//!
//! Each payload digests through the canonical envelope
//! `{domain, primaryType, message}`; `primaryType` keeps equal-shaped
//! payloads in disjoint digest domains.

use serde::{Deserialize, Serialize};

use badges_core::{sha256_digest, Address, CanonicalBytes, ContentDigest, RaftTokenId, SpecUri};
use badges_crypto::MerkleRoot;

use crate::domain::SigningDomain;
use crate::verify::AgreementError;

/// Direct-mint agreement between two parties over a spec URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    /// The party expected to submit the on-chain call.
    pub active: Address,
    /// The counterparty whose signature authorizes the mint.
    pub passive: Address,
    /// The spec URI the credential is minted against.
    #[serde(rename = "tokenURI")]
    pub token_uri: SpecUri,
}

/// Batch-mint agreement carrying a committed allowlist root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleAgreement {
    /// The issuer whose signature authorizes the whole batch.
    pub passive: Address,
    /// The spec URI the credentials are minted against.
    #[serde(rename = "tokenURI")]
    pub token_uri: SpecUri,
    /// The allowlist root the issuer commits to.
    pub root: MerkleRoot,
}

/// Claimant-side consent payload for dual-signature merkle minting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// The claimant requesting the credential.
    pub requester: Address,
    /// The spec URI the credential is requested against.
    #[serde(rename = "tokenURI")]
    pub token_uri: SpecUri,
}

/// Delegated spec-registration permit signed by the raft owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSpecPermit {
    /// The delegate authorized to register the spec.
    pub to: Address,
    /// The raft token the spec will be registered under.
    #[serde(rename = "raftTokenId")]
    pub raft_token_id: RaftTokenId,
}

/// The canonical envelope every typed payload digests through.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    domain: &'a SigningDomain,
    #[serde(rename = "primaryType")]
    primary_type: &'static str,
    message: &'a T,
}

fn typed_digest<T: Serialize>(
    domain: &SigningDomain,
    primary_type: &'static str,
    message: &T,
) -> Result<ContentDigest, AgreementError> {
    let envelope = Envelope {
        domain,
        primary_type,
        message,
    };
    let canonical = CanonicalBytes::new(&envelope)?;
    Ok(sha256_digest(&canonical))
}

impl Agreement {
    /// Compute this agreement's digest under the given domain.
    pub fn digest(&self, domain: &SigningDomain) -> Result<ContentDigest, AgreementError> {
        typed_digest(domain, "Agreement", self)
    }
}

impl MerkleAgreement {
    /// Compute this agreement's digest under the given domain.
    pub fn digest(&self, domain: &SigningDomain) -> Result<ContentDigest, AgreementError> {
        typed_digest(domain, "MerkleAgreement", self)
    }
}

impl Request {
    /// Compute this request's digest under the given domain.
    pub fn digest(&self, domain: &SigningDomain) -> Result<ContentDigest, AgreementError> {
        typed_digest(domain, "Request", self)
    }
}

impl CreateSpecPermit {
    /// Compute this permit's digest under the given domain.
    pub fn digest(&self, domain: &SigningDomain) -> Result<ContentDigest, AgreementError> {
        typed_digest(domain, "CreateSpecPermit", self)
    }
}

/// Compute the direct-mint agreement digest for an
/// `(active, passive, specUri)` triple.
///
/// Pure function: no state, no side effects. Exactly matches the digest an
/// off-chain signer computes through the same canonical pipeline.
pub fn agreement_digest(
    domain: &SigningDomain,
    active: Address,
    passive: Address,
    token_uri: &SpecUri,
) -> Result<ContentDigest, AgreementError> {
    Agreement {
        active,
        passive,
        token_uri: token_uri.clone(),
    }
    .digest(domain)
}

/// Compute the batch-mint agreement digest for a
/// `(passive, specUri, root)` triple.
pub fn merkle_agreement_digest(
    domain: &SigningDomain,
    passive: Address,
    token_uri: &SpecUri,
    root: MerkleRoot,
) -> Result<ContentDigest, AgreementError> {
    MerkleAgreement {
        passive,
        token_uri: token_uri.clone(),
        root,
    }
    .digest(domain)
}

/// Compute the claimant-consent digest for a `(requester, specUri)` pair.
pub fn request_digest(
    domain: &SigningDomain,
    requester: Address,
    token_uri: &SpecUri,
) -> Result<ContentDigest, AgreementError> {
    Request {
        requester,
        token_uri: token_uri.clone(),
    }
    .digest(domain)
}

/// Compute the delegated-registration permit digest for a
/// `(to, raftTokenId)` pair.
pub fn create_spec_permit_digest(
    domain: &SigningDomain,
    to: Address,
    raft_token_id: RaftTokenId,
) -> Result<ContentDigest, AgreementError> {
    CreateSpecPermit { to, raft_token_id }.digest(domain)
}
