//! # Protocol Error Taxonomy
//!
//! One variant per failure condition the protocol can reject with. Every
//! error aborts the whole operation — callers observe either a fully
//! applied state change or none at all.

use thiserror::Error;

use badges_agreement::AgreementError;
use badges_core::error::CanonicalizationError;
use badges_core::{CredentialId, SpecUri};
use badges_crypto::{LeafHash, MerkleRoot};

/// Failure conditions of the badge protocol.
#[derive(Error, Debug)]
pub enum BadgeError {
    /// Caller lacks the required role: not the raft owner, not the
    /// registry owner, or not the expected party for the entry point.
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Which authorization check failed.
        reason: String,
    },

    /// The spec URI has already been registered.
    #[error("spec already registered: {spec_uri}")]
    AlreadyRegistered {
        /// The colliding URI.
        spec_uri: SpecUri,
    },

    /// Lookup against a nonexistent authority token, credential, or spec.
    #[error("not found: {what}")]
    NotFound {
        /// What the lookup was for.
        what: String,
    },

    /// Recovered signer mismatch, malformed signature bytes, or a merkle
    /// proof that does not verify against the committed root.
    #[error("invalid signature: {reason}")]
    InvalidSignature {
        /// Why verification failed.
        reason: String,
    },

    /// Minting attempted against an unregistered spec URI.
    #[error("spec not registered: {spec_uri}")]
    SpecNotRegistered {
        /// The unregistered URI.
        spec_uri: SpecUri,
    },

    /// Deterministic credential id collision — the agreement has already
    /// been fulfilled.
    #[error("token already exists: {credential_id}")]
    TokenExists {
        /// The colliding id.
        credential_id: CredentialId,
    },

    /// The merkle leaf has already been consumed against this root.
    #[error("leaf already used for root {root}")]
    AlreadyUsed {
        /// The committed root.
        root: MerkleRoot,
        /// The consumed leaf.
        leaf: LeafHash,
    },

    /// Revocation attempted on an already-revoked credential.
    #[error("credential already revoked: {credential_id}")]
    AlreadyRevoked {
        /// The credential.
        credential_id: CredentialId,
    },

    /// Reinstatement attempted on a credential that is not revoked.
    #[error("credential not revoked: {credential_id}")]
    NotRevoked {
        /// The credential.
        credential_id: CredentialId,
    },

    /// Issuer and recipient are identical in the give flow.
    #[error("cannot give a badge to self")]
    CannotGiveToSelf,

    /// Empty batch input to the metadata refresh call.
    #[error("no spec uris provided")]
    NoSpecUrisProvided,

    /// Canonicalization of a protocol payload failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl From<AgreementError> for BadgeError {
    fn from(err: AgreementError) -> Self {
        match err {
            AgreementError::InvalidSignature(reason) => Self::InvalidSignature { reason },
            AgreementError::Canonicalization(e) => Self::Canonicalization(e),
        }
    }
}
