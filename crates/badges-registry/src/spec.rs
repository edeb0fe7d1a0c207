//! # Spec Registry
//!
//! Maps a spec URI to the raft token that registered it. A spec may be
//! registered at most once and is immutable afterwards; the registering
//! address is retained as provenance only — every later authorization
//! check resolves against the raft token's *current* owner through the
//! [`OwnershipOracle`].
//!
//! ## Two-Phase Wire-Up
//!
//! The spec registry and the badge dispatcher are deployed before either
//! knows the other's address, so both peer pointers start unset and are
//! filled in by owner-gated setter calls. The pointers are discovery
//! metadata (carried on `SpecCreated` events); they are not consulted for
//! authorization.

use tracing::info;

use badges_agreement::{create_spec_permit_digest, SigningDomain};
use badges_core::{Address, RaftTokenId, SpecUri};
use badges_crypto::CompactSignature;

use crate::error::BadgeError;
use crate::event::{BadgeEvent, EventLog};
use crate::raft::OwnershipOracle;
use crate::store::{KeyValueStore, MemoryStore};

/// A registered spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRecord {
    /// The raft token the spec is bound to.
    pub raft_token_id: RaftTokenId,
    /// Who registered the spec (provenance only, may go stale).
    pub registered_by: Address,
}

/// Read-only spec lookup, implemented by [`SpecRegistry`].
///
/// The credential ledger and dispatcher take this as an injected
/// collaborator so they stay independent of the registry's store type.
pub trait SpecLookup {
    /// The record for a spec URI, if registered.
    fn spec_record(&self, spec_uri: &SpecUri) -> Option<SpecRecord>;
}

/// The spec registry.
#[derive(Debug)]
pub struct SpecRegistry<S = MemoryStore<SpecUri, SpecRecord>>
where
    S: KeyValueStore<SpecUri, SpecRecord>,
{
    owner: Address,
    authority_registry_address: Option<Address>,
    credential_registry_address: Option<Address>,
    specs: S,
    events: EventLog,
}

impl SpecRegistry {
    /// Create a registry with the default in-memory store.
    pub fn new(owner: Address) -> Self {
        Self::with_store(owner, MemoryStore::new())
    }
}

impl<S> SpecRegistry<S>
where
    S: KeyValueStore<SpecUri, SpecRecord>,
{
    /// Create a registry backed by an injected store.
    pub fn with_store(owner: Address, specs: S) -> Self {
        Self {
            owner,
            authority_registry_address: None,
            credential_registry_address: None,
            specs,
            events: EventLog::new(),
        }
    }

    /// Register a spec under a raft token the caller currently owns.
    ///
    /// Fails with `AlreadyRegistered` on URI collision and `Unauthorized`
    /// when the caller is not the token's current owner.
    pub fn register_spec(
        &mut self,
        caller: Address,
        spec_uri: SpecUri,
        raft_token_id: RaftTokenId,
        oracle: &dyn OwnershipOracle,
    ) -> Result<(), BadgeError> {
        if self.specs.contains(&spec_uri) {
            return Err(BadgeError::AlreadyRegistered { spec_uri });
        }
        let raft_owner = oracle.owner_of(raft_token_id)?;
        if caller != raft_owner {
            return Err(BadgeError::Unauthorized {
                reason: format!("caller does not own {raft_token_id}"),
            });
        }
        self.insert_spec(caller, spec_uri, raft_token_id);
        Ok(())
    }

    /// Register a spec on behalf of the raft owner, authorized by a signed
    /// `CreateSpecPermit`.
    ///
    /// The raft token's current owner signs `{to: caller, raftTokenId}`;
    /// the delegate submits the registration. A signature from anyone else
    /// is `InvalidSignature`.
    pub fn register_spec_with_signature(
        &mut self,
        caller: Address,
        spec_uri: SpecUri,
        raft_token_id: RaftTokenId,
        signature: &CompactSignature,
        domain: &SigningDomain,
        oracle: &dyn OwnershipOracle,
    ) -> Result<(), BadgeError> {
        if self.specs.contains(&spec_uri) {
            return Err(BadgeError::AlreadyRegistered { spec_uri });
        }
        let raft_owner = oracle.owner_of(raft_token_id)?;
        let digest = create_spec_permit_digest(domain, caller, raft_token_id)?;
        signature
            .check(raft_owner, &digest)
            .map_err(|e| BadgeError::InvalidSignature {
                reason: e.to_string(),
            })?;
        self.insert_spec(caller, spec_uri, raft_token_id);
        Ok(())
    }

    fn insert_spec(&mut self, to: Address, spec_uri: SpecUri, raft_token_id: RaftTokenId) {
        self.specs.insert(
            spec_uri.clone(),
            SpecRecord {
                raft_token_id,
                registered_by: to,
            },
        );
        info!(%spec_uri, %raft_token_id, "spec registered");
        self.events.emit(BadgeEvent::SpecCreated {
            to,
            spec_uri,
            raft_token_id,
            raft_registry_address: self.authority_registry_address,
        });
    }

    /// The raft token a spec is bound to, or `NotFound`.
    pub fn authority_token_id(&self, spec_uri: &SpecUri) -> Result<RaftTokenId, BadgeError> {
        self.specs
            .get(spec_uri)
            .map(|r| r.raft_token_id)
            .ok_or_else(|| BadgeError::NotFound {
                what: format!("spec {spec_uri}"),
            })
    }

    /// Set the authority registry peer address. Owner-gated.
    pub fn set_authority_registry_address(
        &mut self,
        caller: Address,
        address: Address,
    ) -> Result<(), BadgeError> {
        self.set_peer(caller, |s| s.authority_registry_address = Some(address))
    }

    /// Set the credential registry peer address. Owner-gated.
    pub fn set_credential_registry_address(
        &mut self,
        caller: Address,
        address: Address,
    ) -> Result<(), BadgeError> {
        self.set_peer(caller, |s| s.credential_registry_address = Some(address))
    }

    fn set_peer(
        &mut self,
        caller: Address,
        apply: impl FnOnce(&mut Self),
    ) -> Result<(), BadgeError> {
        if caller != self.owner {
            return Err(BadgeError::Unauthorized {
                reason: "only the registry owner may set peer addresses".to_string(),
            });
        }
        apply(self);
        Ok(())
    }

    /// The wired authority registry address, if set.
    pub fn authority_registry_address(&self) -> Option<Address> {
        self.authority_registry_address
    }

    /// The wired credential registry address, if set.
    pub fn credential_registry_address(&self) -> Option<Address> {
        self.credential_registry_address
    }

    /// Number of registered specs.
    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    /// The events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

impl<S> SpecLookup for SpecRegistry<S>
where
    S: KeyValueStore<SpecUri, SpecRecord>,
{
    fn spec_record(&self, spec_uri: &SpecUri) -> Option<SpecRecord> {
        self.specs.get(spec_uri).cloned()
    }
}
