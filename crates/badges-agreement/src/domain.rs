//! # Signing Domain
//!
//! Scopes agreement signatures to a single deployment. Two deployments of
//! the same contract logic (different chain, different dispatcher address,
//! or a version bump) produce disjoint digest spaces, so a signature
//! collected for one can never be replayed against another.

use serde::{Deserialize, Serialize};

use badges_core::Address;

/// The domain a typed payload is signed under.
///
/// Field names serialize in their wire form (`chainId`,
/// `verifyingContract`) — the serialized shape is part of the bit-exact
/// digest contract and must not drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    /// Deployment name (e.g. `"Badges"`).
    pub name: String,
    /// Deployment version string (e.g. `"0.3.0"`).
    pub version: String,
    /// Network identifier.
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    /// Address of the dispatcher this domain belongs to.
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: Address,
}

impl SigningDomain {
    /// Construct a signing domain.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = 1;
        Address::from_bytes(bytes)
    }

    #[test]
    fn wire_field_names() {
        let domain = SigningDomain::new("Badges", "0.3.0", 31337, dispatcher());
        let val = serde_json::to_value(&domain).unwrap();
        assert!(val.get("chainId").is_some());
        assert!(val.get("verifyingContract").is_some());
        assert!(val.get("chain_id").is_none());
        assert!(val.get("verifying_contract").is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let domain = SigningDomain::new("Badges", "0.3.0", 31337, dispatcher());
        let json = serde_json::to_string(&domain).unwrap();
        let parsed: SigningDomain = serde_json::from_str(&json).unwrap();
        assert_eq!(domain, parsed);
    }
}
