//! # Badge Dispatcher — Minting Entry Points
//!
//! The four verified paths to a minted credential, plus the lifecycle and
//! maintenance surface of the badge deployment:
//!
//! - [`take()`](BadgeDispatcher::take) — the claimant submits a voucher the
//!   issuer signed.
//! - [`give()`](BadgeDispatcher::give) — the issuer submits an acceptance
//!   the claimant signed.
//! - [`merkle_take()`](BadgeDispatcher::merkle_take) — the claimant proves
//!   membership in an allowlist whose root the issuer signed once.
//! - [`merkle_mint_with_consent()`](BadgeDispatcher::merkle_mint_with_consent)
//!   — both parties sign; either may submit.
//!
//! Every entry point enforces: the spec is registered, the deterministic
//! credential id is unused, the signature validates against the party the
//! protocol expects, and the issuing side currently owns the spec's raft
//! token. All checks run before any state mutation.
//!
//! Check ordering is part of the observable contract: in the direct flows
//! the id-collision check precedes signature and ownership checks, so a
//! replayed claim fails `TokenExists` even when raft ownership has changed
//! since the first mint. In the merkle flows the used-leaf check precedes
//! the id check, so redeeming the same leaf twice fails `AlreadyUsed`.

use tracing::info;

use badges_agreement::{
    agreement_digest, check_signature, merkle_agreement_digest, request_digest, SigningDomain,
};
use badges_core::{Address, CredentialId, RaftTokenId, SpecUri};
use badges_crypto::{leaf_hash, verify_proof, CompactSignature, LeafHash, MerkleProof, MerkleRoot};

use crate::allowlist::LeafGate;
use crate::credential::{credential_id_for, Credential, CredentialLedger, RevocationReason};
use crate::error::BadgeError;
use crate::event::{BadgeEvent, EventLog};
use crate::raft::OwnershipOracle;
use crate::spec::{SpecLookup, SpecRecord};
use crate::store::{KeyValueStore, MemoryStore};

/// The badge minting dispatcher.
///
/// Owns the credential ledger and the used-leaf gate; consults the spec
/// registry and ownership oracle through injected interfaces.
#[derive(Debug)]
pub struct BadgeDispatcher<CS = MemoryStore<CredentialId, Credential>, LS = MemoryStore<(MerkleRoot, LeafHash), ()>>
where
    CS: KeyValueStore<CredentialId, Credential>,
    LS: KeyValueStore<(MerkleRoot, LeafHash), ()>,
{
    owner: Address,
    domain: SigningDomain,
    ledger: CredentialLedger<CS>,
    gate: LeafGate<LS>,
    events: EventLog,
}

impl BadgeDispatcher {
    /// Create a dispatcher with default in-memory stores.
    pub fn new(owner: Address, domain: SigningDomain) -> Self {
        Self::with_stores(owner, domain, MemoryStore::new(), MemoryStore::new())
    }
}

impl<CS, LS> BadgeDispatcher<CS, LS>
where
    CS: KeyValueStore<CredentialId, Credential>,
    LS: KeyValueStore<(MerkleRoot, LeafHash), ()>,
{
    /// Create a dispatcher backed by injected stores.
    pub fn with_stores(
        owner: Address,
        domain: SigningDomain,
        credential_store: CS,
        leaf_store: LS,
    ) -> Self {
        Self {
            owner,
            domain,
            ledger: CredentialLedger::with_store(credential_store),
            gate: LeafGate::with_store(leaf_store),
            events: EventLog::new(),
        }
    }

    /// The signing domain this dispatcher verifies against.
    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    // -----------------------------------------------------------------------
    // Minting entry points
    // -----------------------------------------------------------------------

    /// Claimant-initiated mint: `caller` redeems a voucher signed by the
    /// issuer (`passive`).
    pub fn take(
        &mut self,
        caller: Address,
        passive: Address,
        spec_uri: &SpecUri,
        signature: &CompactSignature,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<CredentialId, BadgeError> {
        let record = require_spec(specs, spec_uri)?;
        let credential_id = self.require_unminted(caller, spec_uri)?;

        let digest = agreement_digest(&self.domain, caller, passive, spec_uri)?;
        check_signature(passive, &digest, signature)?;
        require_issuer(passive, &record, oracle)?;

        self.ledger.mint(credential_id, caller, spec_uri.clone())?;
        info!(%credential_id, claimant = %caller, issuer = %passive, "badge taken");
        Ok(credential_id)
    }

    /// Issuer-initiated mint: `caller` awards a badge that the recipient
    /// (`to`) signed for. Fails with `CannotGiveToSelf` when the issuer
    /// names itself as recipient.
    pub fn give(
        &mut self,
        caller: Address,
        to: Address,
        spec_uri: &SpecUri,
        signature: &CompactSignature,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<CredentialId, BadgeError> {
        if caller == to {
            return Err(BadgeError::CannotGiveToSelf);
        }
        let record = require_spec(specs, spec_uri)?;
        let credential_id = self.require_unminted(to, spec_uri)?;

        // Roles flip: the issuer is active, the recipient passive.
        let digest = agreement_digest(&self.domain, caller, to, spec_uri)?;
        check_signature(to, &digest, signature)?;
        require_issuer(caller, &record, oracle)?;

        self.ledger.mint(credential_id, to, spec_uri.clone())?;
        info!(%credential_id, claimant = %to, issuer = %caller, "badge given");
        Ok(credential_id)
    }

    /// Allowlist mint: `caller` proves membership under a root the issuer
    /// signed. Each leaf redeems at most once per root.
    #[allow(clippy::too_many_arguments)]
    pub fn merkle_take(
        &mut self,
        caller: Address,
        issuer: Address,
        spec_uri: &SpecUri,
        root: MerkleRoot,
        proof: &MerkleProof,
        signature: &CompactSignature,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<CredentialId, BadgeError> {
        let record = require_spec(specs, spec_uri)?;

        let digest = merkle_agreement_digest(&self.domain, issuer, spec_uri, root)?;
        check_signature(issuer, &digest, signature)?;

        let leaf = leaf_hash(&caller);
        require_membership(root, proof, leaf)?;
        if self.gate.is_used(root, leaf) {
            return Err(BadgeError::AlreadyUsed { root, leaf });
        }

        let credential_id = self.require_unminted(caller, spec_uri)?;
        require_issuer(issuer, &record, oracle)?;

        // Checks passed; mutate.
        self.gate.mark_used(root, leaf)?;
        self.ledger.mint(credential_id, caller, spec_uri.clone())?;
        info!(%credential_id, claimant = %caller, issuer = %issuer, %root, "badge taken from allowlist");
        Ok(credential_id)
    }

    /// Dual-consent allowlist mint: the issuer signs the root-bearing
    /// agreement, the claimant signs a request, and either party submits.
    #[allow(clippy::too_many_arguments)]
    pub fn merkle_mint_with_consent(
        &mut self,
        caller: Address,
        issuer: Address,
        claimant: Address,
        spec_uri: &SpecUri,
        root: MerkleRoot,
        proof: &MerkleProof,
        issuer_signature: &CompactSignature,
        claimant_signature: &CompactSignature,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<CredentialId, BadgeError> {
        if caller != issuer && caller != claimant {
            return Err(BadgeError::Unauthorized {
                reason: "caller is neither issuer nor claimant".to_string(),
            });
        }
        let record = require_spec(specs, spec_uri)?;

        // Both signatures are independently verified.
        let issuer_digest = merkle_agreement_digest(&self.domain, issuer, spec_uri, root)?;
        check_signature(issuer, &issuer_digest, issuer_signature)?;
        let claimant_digest = request_digest(&self.domain, claimant, spec_uri)?;
        check_signature(claimant, &claimant_digest, claimant_signature)?;

        let leaf = leaf_hash(&claimant);
        require_membership(root, proof, leaf)?;
        if self.gate.is_used(root, leaf) {
            return Err(BadgeError::AlreadyUsed { root, leaf });
        }

        let credential_id = self.require_unminted(claimant, spec_uri)?;
        require_issuer(issuer, &record, oracle)?;

        self.gate.mark_used(root, leaf)?;
        self.ledger.mint(credential_id, claimant, spec_uri.clone())?;
        info!(%credential_id, %claimant, %issuer, %root, "badge minted with dual consent");
        Ok(credential_id)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Revoke a credential. See [`CredentialLedger::revoke()`].
    pub fn revoke(
        &mut self,
        caller: Address,
        raft_token_id: RaftTokenId,
        credential_id: CredentialId,
        reason: RevocationReason,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<(), BadgeError> {
        self.ledger
            .revoke(caller, raft_token_id, credential_id, reason, oracle, specs)
    }

    /// Reinstate a revoked credential. See [`CredentialLedger::reinstate()`].
    pub fn reinstate(
        &mut self,
        caller: Address,
        raft_token_id: RaftTokenId,
        credential_id: CredentialId,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<(), BadgeError> {
        self.ledger
            .reinstate(caller, raft_token_id, credential_id, oracle, specs)
    }

    /// Whether a credential is currently valid.
    pub fn is_valid(&self, credential_id: CredentialId) -> Result<bool, BadgeError> {
        self.ledger.is_valid(credential_id)
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Signal downstream indexers to re-fetch metadata for these specs.
    ///
    /// Owner-only; no state change beyond the event emission. Fails with
    /// `NoSpecUrisProvided` on empty input.
    pub fn refresh_metadata(
        &mut self,
        caller: Address,
        spec_uris: Vec<SpecUri>,
    ) -> Result<(), BadgeError> {
        if caller != self.owner {
            return Err(BadgeError::Unauthorized {
                reason: "only the dispatcher owner may refresh metadata".to_string(),
            });
        }
        if spec_uris.is_empty() {
            return Err(BadgeError::NoSpecUrisProvided);
        }
        info!(count = spec_uris.len(), "metadata refresh requested");
        self.events
            .emit(BadgeEvent::MetadataRefreshRequested { spec_uris });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The claimant a credential is bound to.
    pub fn owner_of(&self, credential_id: CredentialId) -> Result<Address, BadgeError> {
        self.ledger.owner_of(credential_id)
    }

    /// The spec URI a credential was minted against.
    pub fn token_uri(&self, credential_id: CredentialId) -> Result<&SpecUri, BadgeError> {
        self.ledger.token_uri(credential_id)
    }

    /// Number of credentials bound to `owner`.
    pub fn balance_of(&self, owner: Address) -> usize {
        self.ledger.balance_of(owner)
    }

    /// Full credential record, if minted.
    pub fn credential(&self, credential_id: CredentialId) -> Option<&Credential> {
        self.ledger.credential(credential_id)
    }

    /// The dispatcher owner.
    pub fn dispatcher_owner(&self) -> Address {
        self.owner
    }

    /// Events from the credential ledger (mints and lifecycle changes).
    pub fn credential_events(&self) -> &EventLog {
        self.ledger.events()
    }

    /// Events from the dispatcher itself (maintenance).
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn require_unminted(
        &self,
        to: Address,
        spec_uri: &SpecUri,
    ) -> Result<CredentialId, BadgeError> {
        let credential_id = credential_id_for(to, spec_uri)?;
        if self.ledger.exists(credential_id) {
            return Err(BadgeError::TokenExists { credential_id });
        }
        Ok(credential_id)
    }
}

fn require_spec(specs: &dyn SpecLookup, spec_uri: &SpecUri) -> Result<SpecRecord, BadgeError> {
    specs
        .spec_record(spec_uri)
        .ok_or_else(|| BadgeError::SpecNotRegistered {
            spec_uri: spec_uri.clone(),
        })
}

/// The issuing side of a mint must currently own the spec's raft token.
fn require_issuer(
    issuer: Address,
    record: &SpecRecord,
    oracle: &dyn OwnershipOracle,
) -> Result<(), BadgeError> {
    let raft_owner = oracle.owner_of(record.raft_token_id)?;
    if issuer != raft_owner {
        return Err(BadgeError::Unauthorized {
            reason: format!("issuer does not own {}", record.raft_token_id),
        });
    }
    Ok(())
}

/// A failed merkle proof is a failed authorization, reported in the
/// signature/proof validation class.
fn require_membership(
    root: MerkleRoot,
    proof: &MerkleProof,
    leaf: LeafHash,
) -> Result<(), BadgeError> {
    if !verify_proof(&root, proof, &leaf) {
        return Err(BadgeError::InvalidSignature {
            reason: "merkle proof does not verify against committed root".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raft::RaftRegistry;
    use crate::spec::SpecRegistry;
    use badges_crypto::{AllowlistTree, Ed25519KeyPair};

    fn addr(i: u8) -> Address {
        Address::from_bytes([i; 20])
    }

    fn uri(s: &str) -> SpecUri {
        SpecUri::new(s).unwrap()
    }

    struct Fixture {
        rafts: RaftRegistry,
        specs: SpecRegistry,
        dispatcher: BadgeDispatcher,
        issuer: Ed25519KeyPair,
        claimant: Ed25519KeyPair,
    }

    /// Issuer owns raft token 1 and has registered "ipfs://cred-A".
    fn fixture() -> Fixture {
        let issuer = Ed25519KeyPair::generate();
        let claimant = Ed25519KeyPair::generate();

        let mut rafts = RaftRegistry::new(addr(1));
        rafts.mint(addr(1), issuer.address(), "ipfs://org").unwrap();

        let mut specs = SpecRegistry::new(addr(1));
        specs
            .register_spec(
                issuer.address(),
                uri("ipfs://cred-A"),
                RaftTokenId(1),
                &rafts,
            )
            .unwrap();

        let domain = SigningDomain::new("Badges", "0.3.0", 31337, addr(0x10));
        let dispatcher = BadgeDispatcher::new(addr(1), domain);

        Fixture {
            rafts,
            specs,
            dispatcher,
            issuer,
            claimant,
        }
    }

    fn take_signature(f: &Fixture, spec_uri: &SpecUri) -> CompactSignature {
        let digest = agreement_digest(
            f.dispatcher.domain(),
            f.claimant.address(),
            f.issuer.address(),
            spec_uri,
        )
        .unwrap();
        f.issuer.sign_compact(&digest)
    }

    #[test]
    fn take_mints_to_claimant() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let sig = take_signature(&f, &spec);

        let id = f
            .dispatcher
            .take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap();

        assert_eq!(f.dispatcher.owner_of(id).unwrap(), f.claimant.address());
        assert_eq!(f.dispatcher.token_uri(id).unwrap(), &spec);
        assert_eq!(f.dispatcher.balance_of(f.claimant.address()), 1);
        assert!(f.dispatcher.is_valid(id).unwrap());
    }

    #[test]
    fn take_replay_is_token_exists() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let sig = take_signature(&f, &spec);

        f.dispatcher
            .take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap();
        let err = f
            .dispatcher
            .take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::TokenExists { .. }));
        assert_eq!(f.dispatcher.balance_of(f.claimant.address()), 1);
    }

    #[test]
    fn take_unregistered_spec_rejected() {
        let mut f = fixture();
        let spec = uri("ipfs://unregistered");
        let sig = take_signature(&f, &spec);
        let err = f
            .dispatcher
            .take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::SpecNotRegistered { .. }));
    }

    #[test]
    fn take_with_impostor_signature_rejected() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let impostor = Ed25519KeyPair::generate();
        let digest = agreement_digest(
            f.dispatcher.domain(),
            f.claimant.address(),
            f.issuer.address(),
            &spec,
        )
        .unwrap();
        let sig = impostor.sign_compact(&digest);

        let err = f
            .dispatcher
            .take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::InvalidSignature { .. }));
        assert_eq!(f.dispatcher.balance_of(f.claimant.address()), 0);
    }

    #[test]
    fn take_voucher_from_non_raft_owner_rejected() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        // A signer who is not the raft owner signs their own voucher.
        let outsider = Ed25519KeyPair::generate();
        let digest = agreement_digest(
            f.dispatcher.domain(),
            f.claimant.address(),
            outsider.address(),
            &spec,
        )
        .unwrap();
        let sig = outsider.sign_compact(&digest);

        let err = f
            .dispatcher
            .take(
                f.claimant.address(),
                outsider.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::Unauthorized { .. }));
    }

    #[test]
    fn give_mints_to_recipient() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        // Roles flip: claimant is passive and signs.
        let digest = agreement_digest(
            f.dispatcher.domain(),
            f.issuer.address(),
            f.claimant.address(),
            &spec,
        )
        .unwrap();
        let sig = f.claimant.sign_compact(&digest);

        let id = f
            .dispatcher
            .give(
                f.issuer.address(),
                f.claimant.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap();
        assert_eq!(f.dispatcher.owner_of(id).unwrap(), f.claimant.address());
    }

    #[test]
    fn give_to_self_rejected() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let digest = agreement_digest(
            f.dispatcher.domain(),
            f.issuer.address(),
            f.issuer.address(),
            &spec,
        )
        .unwrap();
        let sig = f.issuer.sign_compact(&digest);

        let err = f
            .dispatcher
            .give(
                f.issuer.address(),
                f.issuer.address(),
                &spec,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::CannotGiveToSelf));
    }

    #[test]
    fn give_then_take_collides() {
        // The claim binds (recipient, spec), so the direction of the first
        // mint does not matter: the second one collides.
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");

        let give_digest = agreement_digest(
            f.dispatcher.domain(),
            f.issuer.address(),
            f.claimant.address(),
            &spec,
        )
        .unwrap();
        let give_sig = f.claimant.sign_compact(&give_digest);
        f.dispatcher
            .give(
                f.issuer.address(),
                f.claimant.address(),
                &spec,
                &give_sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap();

        let take_sig = take_signature(&f, &spec);
        let err = f
            .dispatcher
            .take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                &take_sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::TokenExists { .. }));
    }

    #[test]
    fn merkle_take_single_use() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let other = Ed25519KeyPair::generate();
        let members = vec![f.claimant.address(), other.address(), addr(9)];
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        let root = tree.root();

        let digest =
            merkle_agreement_digest(f.dispatcher.domain(), f.issuer.address(), &spec, root)
                .unwrap();
        let sig = f.issuer.sign_compact(&digest);
        let proof = tree.proof_for(&f.claimant.address()).unwrap();

        let id = f
            .dispatcher
            .merkle_take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                root,
                &proof,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap();
        assert_eq!(f.dispatcher.owner_of(id).unwrap(), f.claimant.address());

        // The same leaf cannot redeem twice off the same signed batch.
        let err = f
            .dispatcher
            .merkle_take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                root,
                &proof,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::AlreadyUsed { .. }));
    }

    #[test]
    fn merkle_take_outsider_rejected() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let members = vec![addr(8), addr(9)];
        let tree = AllowlistTree::from_addresses(&members).unwrap();
        let root = tree.root();

        let digest =
            merkle_agreement_digest(f.dispatcher.domain(), f.issuer.address(), &spec, root)
                .unwrap();
        let sig = f.issuer.sign_compact(&digest);
        // An outsider borrows a member's proof.
        let proof = tree.proof_for(&addr(8)).unwrap();

        let err = f
            .dispatcher
            .merkle_take(
                f.claimant.address(),
                f.issuer.address(),
                &spec,
                root,
                &proof,
                &sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::InvalidSignature { .. }));
    }

    #[test]
    fn merkle_consent_either_party_submits() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let tree = AllowlistTree::from_addresses(&[f.claimant.address()]).unwrap();
        let root = tree.root();
        let proof = tree.proof_for(&f.claimant.address()).unwrap();

        let issuer_digest =
            merkle_agreement_digest(f.dispatcher.domain(), f.issuer.address(), &spec, root)
                .unwrap();
        let issuer_sig = f.issuer.sign_compact(&issuer_digest);
        let claimant_digest =
            request_digest(f.dispatcher.domain(), f.claimant.address(), &spec).unwrap();
        let claimant_sig = f.claimant.sign_compact(&claimant_digest);

        // The issuer submits.
        let id = f
            .dispatcher
            .merkle_mint_with_consent(
                f.issuer.address(),
                f.issuer.address(),
                f.claimant.address(),
                &spec,
                root,
                &proof,
                &issuer_sig,
                &claimant_sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap();
        assert_eq!(f.dispatcher.owner_of(id).unwrap(), f.claimant.address());
    }

    #[test]
    fn merkle_consent_third_party_cannot_submit() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let tree = AllowlistTree::from_addresses(&[f.claimant.address()]).unwrap();
        let root = tree.root();
        let proof = tree.proof_for(&f.claimant.address()).unwrap();

        let issuer_digest =
            merkle_agreement_digest(f.dispatcher.domain(), f.issuer.address(), &spec, root)
                .unwrap();
        let issuer_sig = f.issuer.sign_compact(&issuer_digest);
        let claimant_digest =
            request_digest(f.dispatcher.domain(), f.claimant.address(), &spec).unwrap();
        let claimant_sig = f.claimant.sign_compact(&claimant_digest);

        let err = f
            .dispatcher
            .merkle_mint_with_consent(
                addr(42),
                f.issuer.address(),
                f.claimant.address(),
                &spec,
                root,
                &proof,
                &issuer_sig,
                &claimant_sig,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::Unauthorized { .. }));
    }

    #[test]
    fn merkle_consent_missing_claimant_consent_rejected() {
        let mut f = fixture();
        let spec = uri("ipfs://cred-A");
        let tree = AllowlistTree::from_addresses(&[f.claimant.address()]).unwrap();
        let root = tree.root();
        let proof = tree.proof_for(&f.claimant.address()).unwrap();

        let issuer_digest =
            merkle_agreement_digest(f.dispatcher.domain(), f.issuer.address(), &spec, root)
                .unwrap();
        let issuer_sig = f.issuer.sign_compact(&issuer_digest);
        // The issuer forges the "consent" with its own key.
        let claimant_digest =
            request_digest(f.dispatcher.domain(), f.claimant.address(), &spec).unwrap();
        let forged = f.issuer.sign_compact(&claimant_digest);

        let err = f
            .dispatcher
            .merkle_mint_with_consent(
                f.issuer.address(),
                f.issuer.address(),
                f.claimant.address(),
                &spec,
                root,
                &proof,
                &issuer_sig,
                &forged,
                &f.rafts,
                &f.specs,
            )
            .unwrap_err();
        assert!(matches!(err, BadgeError::InvalidSignature { .. }));
    }

    #[test]
    fn refresh_metadata_owner_gated_and_nonempty() {
        let mut f = fixture();
        assert!(matches!(
            f.dispatcher
                .refresh_metadata(addr(9), vec![uri("ipfs://cred-A")])
                .unwrap_err(),
            BadgeError::Unauthorized { .. }
        ));
        assert!(matches!(
            f.dispatcher.refresh_metadata(addr(1), vec![]).unwrap_err(),
            BadgeError::NoSpecUrisProvided
        ));

        f.dispatcher
            .refresh_metadata(addr(1), vec![uri("ipfs://cred-A")])
            .unwrap();
        assert!(matches!(
            f.dispatcher.events().records()[0].event,
            BadgeEvent::MetadataRefreshRequested { .. }
        ));
    }
}
