//! # Signer Checking
//!
//! Validates a compact signature envelope against the party the protocol
//! expects to have signed a digest. Every failure mode — signer mismatch,
//! invalid key bytes, corrupt signature, malformed envelope — surfaces as
//! [`AgreementError::InvalidSignature`]; garbage input never crashes the
//! verifier.

use thiserror::Error;

use badges_core::error::{CanonicalizationError, CryptoError};
use badges_core::{Address, ContentDigest};
use badges_crypto::CompactSignature;

/// Errors from agreement digest computation and signature checking.
#[derive(Error, Debug)]
pub enum AgreementError {
    /// The recovered signer does not match the expected party, or the
    /// signature bytes are malformed or fail verification.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Canonicalization of the envelope failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl From<CryptoError> for AgreementError {
    fn from(err: CryptoError) -> Self {
        Self::InvalidSignature(err.to_string())
    }
}

/// Check a compact signature envelope against an expected signer and digest.
///
/// Succeeds only when the address derived from the envelope's embedded
/// public key equals `expected` AND the Ed25519 signature verifies over the
/// digest bytes.
pub fn check_signature(
    expected: Address,
    digest: &ContentDigest,
    signature: &CompactSignature,
) -> Result<(), AgreementError> {
    signature.check(expected, digest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SigningDomain;
    use crate::typed::agreement_digest;
    use badges_core::SpecUri;
    use badges_crypto::Ed25519KeyPair;

    fn domain() -> SigningDomain {
        SigningDomain::new("Badges", "0.3.0", 31337, Address::from_bytes([1u8; 20]))
    }

    #[test]
    fn issuer_signature_validates_for_claimant() {
        let issuer = Ed25519KeyPair::generate();
        let claimant = Ed25519KeyPair::generate();
        let uri = SpecUri::new("ipfs://cred-A").unwrap();

        let digest =
            agreement_digest(&domain(), claimant.address(), issuer.address(), &uri).unwrap();
        let sig = issuer.sign_compact(&digest);

        check_signature(issuer.address(), &digest, &sig).expect("issuer signature should validate");
    }

    #[test]
    fn wrong_signer_rejected() {
        let issuer = Ed25519KeyPair::generate();
        let impostor = Ed25519KeyPair::generate();
        let claimant = Ed25519KeyPair::generate();
        let uri = SpecUri::new("ipfs://cred-A").unwrap();

        let digest =
            agreement_digest(&domain(), claimant.address(), issuer.address(), &uri).unwrap();
        let sig = impostor.sign_compact(&digest);

        let err = check_signature(issuer.address(), &digest, &sig).unwrap_err();
        assert!(matches!(err, AgreementError::InvalidSignature(_)));
    }

    #[test]
    fn signature_over_different_digest_rejected() {
        let issuer = Ed25519KeyPair::generate();
        let claimant = Ed25519KeyPair::generate();
        let uri_a = SpecUri::new("ipfs://cred-A").unwrap();
        let uri_b = SpecUri::new("ipfs://cred-B").unwrap();

        let digest_a =
            agreement_digest(&domain(), claimant.address(), issuer.address(), &uri_a).unwrap();
        let digest_b =
            agreement_digest(&domain(), claimant.address(), issuer.address(), &uri_b).unwrap();
        let sig = issuer.sign_compact(&digest_a);

        assert!(check_signature(issuer.address(), &digest_b, &sig).is_err());
    }

    #[test]
    fn garbage_envelope_is_invalid_signature_not_crash() {
        let issuer = Ed25519KeyPair::generate();
        let claimant = Ed25519KeyPair::generate();
        let uri = SpecUri::new("ipfs://cred-A").unwrap();
        let digest =
            agreement_digest(&domain(), claimant.address(), issuer.address(), &uri).unwrap();

        // A structurally valid envelope whose key bytes are not a curve point.
        let bogus = CompactSignature::from_bytes(&[0xFFu8; 96]).unwrap();
        let err = check_signature(bogus.signer_address(), &digest, &bogus).unwrap_err();
        assert!(matches!(err, AgreementError::InvalidSignature(_)));
    }
}
