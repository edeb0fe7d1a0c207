//! # Merkle Allowlist Tree — Sorted-Pair Inclusion Proofs
//!
//! Commits a batch of pre-approved claimant addresses under a single root.
//! Only the root is ever signed or stored; the full address list stays
//! off-chain, and a claimant proves membership with a sibling path.
//!
//! ## Algorithm
//!
//! Domain-separated SHA-256:
//! - Leaf: `SHA256(0x00 || address_bytes)` over the 20-byte address.
//! - Node: `SHA256(0x01 || lo || hi)` where `(lo, hi)` is the byte-wise
//!   sorted pair of child hashes.
//!
//! Sorted-pair hashing makes proofs side-agnostic: a proof is just the
//! sibling hashes, no left/right flags. An unpaired node at any level is
//! promoted unchanged to the next level — it is never duplicated, since
//! duplication would let a single proof element validate twice.
//!
//! Leaf hashes are sorted and deduplicated before tree construction, so the
//! root is independent of the input address order.
//!
//! ## Security Invariant
//!
//! The leaf and node domains are separated by the `0x00`/`0x01` prefix, so
//! an inner node can never be replayed as a leaf (second-preimage defense).
//! Verification returns `false` for malformed proofs — it never errors or
//! panics.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use badges_core::error::CryptoError;
use badges_core::Address;

/// The committed root of an allowlist tree.
///
/// Serializes as a 64-character lowercase hex string. The root is embedded
/// in the signed merkle agreement digest, which is what binds the batch to
/// the issuer's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MerkleRoot(pub [u8; 32]);

/// A leaf hash: the domain-separated hash of a claimant address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafHash(pub [u8; 32]);

/// An inclusion proof: the sibling hashes from leaf to root.
///
/// Sorted-pair hashing needs no side information, so the proof is a plain
/// hash sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerkleProof(pub Vec<LeafHash>);

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the allowlist leaf hash for a claimant address:
/// `SHA256(0x00 || address_bytes)`.
pub fn leaf_hash(address: &Address) -> LeafHash {
    let mut input = Vec::with_capacity(21);
    input.push(0x00);
    input.extend_from_slice(address.as_bytes());
    LeafHash(sha256_raw(&input))
}

/// Compute a parent node hash: `SHA256(0x01 || lo || hi)` with the pair
/// sorted byte-wise.
fn node_hash(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut input = Vec::with_capacity(65);
    input.push(0x01);
    input.extend_from_slice(lo);
    input.extend_from_slice(hi);
    sha256_raw(&input)
}

fn sha256_raw(b: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(b);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an inclusion proof against a committed root.
///
/// Folds the leaf hash up the sibling path with sorted-pair hashing and
/// compares the result to `root`. Returns `false` for any mismatch; a
/// malformed proof is a failed proof, not an error.
pub fn verify_proof(root: &MerkleRoot, proof: &MerkleProof, leaf: &LeafHash) -> bool {
    let mut cur = leaf.0;
    for sibling in &proof.0 {
        cur = node_hash(&cur, &sibling.0);
    }
    cur == root.0
}

// ---------------------------------------------------------------------------
// Tree construction
// ---------------------------------------------------------------------------

/// An allowlist tree built from a set of claimant addresses.
///
/// Retains every level of the tree so proofs can be generated for any
/// member. The issuer builds this off-chain, signs the root inside a merkle
/// agreement, and distributes proofs to claimants.
#[derive(Debug, Clone)]
pub struct AllowlistTree {
    /// All levels, leaves first. `levels[0]` is the sorted, deduplicated
    /// leaf hashes; the last level holds the single root.
    levels: Vec<Vec<[u8; 32]>>,
}

impl AllowlistTree {
    /// Build a tree from claimant addresses.
    ///
    /// Leaf hashes are sorted and deduplicated, so the root does not depend
    /// on input ordering or repeats.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DigestError` for an empty address set — an
    /// empty allowlist has no meaningful root to commit.
    pub fn from_addresses(addresses: &[Address]) -> Result<Self, CryptoError> {
        if addresses.is_empty() {
            return Err(CryptoError::DigestError(
                "allowlist must contain at least one address".to_string(),
            ));
        }

        let mut leaves: Vec<[u8; 32]> = addresses.iter().map(|a| leaf_hash(a).0).collect();
        leaves.sort_unstable();
        leaves.dedup();

        let mut levels = vec![leaves];
        while levels.last().map(Vec::len).unwrap_or(0) > 1 {
            let prev = levels.last().cloned().unwrap_or_default();
            let mut next = Vec::with_capacity(prev.len().div_ceil(2));
            for pair in prev.chunks(2) {
                match pair {
                    [a, b] => next.push(node_hash(a, b)),
                    // Odd node: promoted unchanged.
                    [a] => next.push(*a),
                    _ => {}
                }
            }
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// The number of distinct leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    /// The committed root.
    pub fn root(&self) -> MerkleRoot {
        // Construction guarantees a final single-entry level.
        let root = self
            .levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or([0u8; 32]);
        MerkleRoot(root)
    }

    /// Build the inclusion proof for a member address.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DigestError` if the address is not in the tree.
    pub fn proof_for(&self, address: &Address) -> Result<MerkleProof, CryptoError> {
        let target = leaf_hash(address).0;
        let leaves = self.levels.first().cloned().unwrap_or_default();
        let mut pos = leaves
            .binary_search(&target)
            .map_err(|_| CryptoError::DigestError(format!("address {address} not in allowlist")))?;

        let mut path = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_pos = pos ^ 1;
            // An unpaired node was promoted; it contributes no sibling.
            if sibling_pos < level.len() {
                path.push(LeafHash(level[sibling_pos]));
            }
            pos /= 2;
        }
        Ok(MerkleProof(path))
    }
}

// ---------------------------------------------------------------------------
// MerkleRoot / LeafHash serde + display
// ---------------------------------------------------------------------------

macro_rules! hex32_impls {
    ($ty:ident, $label:expr) => {
        impl $ty {
            /// Render as a 64-character lowercase hex string.
            pub fn to_hex(&self) -> String {
                self.0.iter().map(|b| format!("{b:02x}")).collect()
            }

            /// Parse from a 64-character hex string.
            pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
                let hex = hex.trim().to_lowercase();
                if hex.len() != 64 {
                    return Err(CryptoError::DigestError(format!(
                        "{} hex must be 64 chars, got {}",
                        $label,
                        hex.len()
                    )));
                }
                let mut out = [0u8; 32];
                for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
                    let s = std::str::from_utf8(chunk)
                        .map_err(|e| CryptoError::DigestError(format!("invalid hex: {e}")))?;
                    out[i] = u8::from_str_radix(s, 16)
                        .map_err(|e| CryptoError::DigestError(format!("invalid hex at {i}: {e}")))?;
                }
                Ok(Self(out))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let hex = String::deserialize(deserializer)?;
                Self::from_hex(&hex).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
}

hex32_impls!(MerkleRoot, "merkle root");
hex32_impls!(LeafHash, "leaf hash");

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(i: u8) -> Address {
        Address::from_public_key_bytes(&[i; 32])
    }

    fn addrs(n: u8) -> Vec<Address> {
        (1..=n).map(addr).collect()
    }

    #[test]
    fn empty_allowlist_rejected() {
        assert!(AllowlistTree::from_addresses(&[]).is_err());
    }

    #[test]
    fn single_member_tree() {
        let members = addrs(1);
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        // Single leaf: the root is the leaf hash and the proof is empty.
        assert_eq!(tree.root().0, leaf_hash(&members[0]).0);
        let proof = tree.proof_for(&members[0]).unwrap();
        assert!(proof.0.is_empty());
        assert!(verify_proof(&tree.root(), &proof, &leaf_hash(&members[0])));
    }

    #[test]
    fn all_members_prove_for_various_sizes() {
        for n in [1u8, 2, 3, 4, 5, 7, 8, 9, 15, 16, 17, 31, 32, 33] {
            let members = addrs(n);
            let tree = AllowlistTree::from_addresses(&members).unwrap();
            let root = tree.root();
            for m in &members {
                let proof = tree.proof_for(m).unwrap();
                assert!(
                    verify_proof(&root, &proof, &leaf_hash(m)),
                    "proof failed for size={n} member={m}"
                );
            }
        }
    }

    #[test]
    fn non_member_has_no_proof() {
        let tree = AllowlistTree::from_addresses(&addrs(8)).unwrap();
        assert!(tree.proof_for(&addr(99)).is_err());
    }

    #[test]
    fn non_member_leaf_fails_verification() {
        let members = addrs(8);
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        let proof = tree.proof_for(&members[0]).unwrap();
        // A valid proof for member 0 does not validate an outsider's leaf.
        assert!(!verify_proof(&tree.root(), &proof, &leaf_hash(&addr(99))));
    }

    #[test]
    fn tampered_proof_fails() {
        let members = addrs(9);
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        let mut proof = tree.proof_for(&members[3]).unwrap();
        assert!(verify_proof(&tree.root(), &proof, &leaf_hash(&members[3])));

        proof.0[0] = LeafHash([0u8; 32]);
        assert!(!verify_proof(&tree.root(), &proof, &leaf_hash(&members[3])));
    }

    #[test]
    fn wrong_root_fails() {
        let members = addrs(4);
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        let proof = tree.proof_for(&members[0]).unwrap();
        let other = AllowlistTree::from_addresses(&addrs(5)).unwrap();
        assert!(!verify_proof(&other.root(), &proof, &leaf_hash(&members[0])));
    }

    #[test]
    fn root_independent_of_input_order() {
        let mut members = addrs(7);
        let forward = AllowlistTree::from_addresses(&members).unwrap();
        members.reverse();
        let backward = AllowlistTree::from_addresses(&members).unwrap();
        assert_eq!(forward.root(), backward.root());
    }

    #[test]
    fn duplicates_deduplicated() {
        let mut members = addrs(4);
        members.push(members[0]);
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(
            tree.root(),
            AllowlistTree::from_addresses(&addrs(4)).unwrap().root()
        );
    }

    #[test]
    fn leaf_domain_separated_from_nodes() {
        // A two-member root must differ from the leaf hash of any address
        // whose raw hash equals the node input — the 0x00/0x01 prefixes
        // separate the domains. Spot-check that leaf and node functions
        // disagree on identical input bytes.
        let a = leaf_hash(&addr(1)).0;
        let b = leaf_hash(&addr(2)).0;
        let parent = node_hash(&a, &b);
        assert_ne!(parent, a);
        assert_ne!(parent, b);
    }

    #[test]
    fn node_hash_is_order_invariant() {
        let a = leaf_hash(&addr(1)).0;
        let b = leaf_hash(&addr(2)).0;
        assert_eq!(node_hash(&a, &b), node_hash(&b, &a));
    }

    #[test]
    fn root_hex_roundtrip() {
        let tree = AllowlistTree::from_addresses(&addrs(3)).unwrap();
        let root = tree.root();
        assert_eq!(MerkleRoot::from_hex(&root.to_hex()).unwrap(), root);
        assert!(MerkleRoot::from_hex("aabb").is_err());
    }

    #[test]
    fn proof_serde_roundtrip() {
        let members = addrs(5);
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        let proof = tree.proof_for(&members[2]).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let parsed: MerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, proof);
    }
}
