//! # Authority Registry — Raft Tokens
//!
//! A raft token represents an organizational identity. Owning one is the
//! credential for registering specs and managing the lifecycle of badges
//! minted under them. Raft tokens are transferable; transfer carries those
//! rights to the new owner without touching the specs already registered.
//!
//! Minting is gated by a pause flag: while paused only the registry owner
//! may mint, while unpaused anyone may. The registry starts paused.
//!
//! ## Authorization
//!
//! The registry implements [`OwnershipOracle`], the interface every
//! raft-gated check in the protocol resolves through. Ownership is always
//! re-queried at authorization time and never cached, so a transfer
//! propagates to authorization decisions immediately.

use tracing::{debug, info};

use badges_core::{Address, RaftTokenId};

use crate::error::BadgeError;
use crate::event::{BadgeEvent, EventLog};
use crate::store::{KeyValueStore, MemoryStore};

/// Resolves the current owner of a raft token.
///
/// Injected into every authorization check so that callers cannot
/// accidentally consult stale ownership.
pub trait OwnershipOracle {
    /// Current owner of the token, or `NotFound` for nonexistent ids.
    fn owner_of(&self, token_id: RaftTokenId) -> Result<Address, BadgeError>;
}

/// A minted authority token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaftToken {
    /// Current owner.
    pub owner: Address,
    /// Metadata URI.
    pub metadata_uri: String,
}

/// The authority token registry.
#[derive(Debug)]
pub struct RaftRegistry<S = MemoryStore<RaftTokenId, RaftToken>>
where
    S: KeyValueStore<RaftTokenId, RaftToken>,
{
    owner: Address,
    paused: bool,
    next_token_id: u64,
    tokens: S,
    events: EventLog,
}

impl RaftRegistry {
    /// Create a registry with the default in-memory store.
    ///
    /// The registry starts paused: only `owner` can mint until
    /// [`unpause()`](Self::unpause) is called.
    pub fn new(owner: Address) -> Self {
        Self::with_store(owner, MemoryStore::new())
    }
}

impl<S> RaftRegistry<S>
where
    S: KeyValueStore<RaftTokenId, RaftToken>,
{
    /// Create a registry backed by an injected store.
    pub fn with_store(owner: Address, tokens: S) -> Self {
        Self {
            owner,
            paused: true,
            next_token_id: 1,
            tokens,
            events: EventLog::new(),
        }
    }

    /// Mint a new raft token to `to`.
    ///
    /// While paused, only the registry owner may mint. Token ids are
    /// assigned from a monotonic counter and never reused.
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        uri: impl Into<String>,
    ) -> Result<RaftTokenId, BadgeError> {
        if self.paused && caller != self.owner {
            return Err(BadgeError::Unauthorized {
                reason: "minting is paused and caller is not the registry owner".to_string(),
            });
        }

        let token_id = RaftTokenId(self.next_token_id);
        let uri = uri.into();
        self.next_token_id += 1;
        self.tokens.insert(
            token_id,
            RaftToken {
                owner: to,
                metadata_uri: uri.clone(),
            },
        );
        info!(%token_id, %to, "raft token minted");
        self.events.emit(BadgeEvent::RaftMinted { token_id, to, uri });
        Ok(token_id)
    }

    /// Update a token's metadata URI. Registry-owner-gated.
    pub fn set_token_uri(
        &mut self,
        caller: Address,
        token_id: RaftTokenId,
        uri: impl Into<String>,
    ) -> Result<(), BadgeError> {
        if caller != self.owner {
            return Err(BadgeError::Unauthorized {
                reason: "only the registry owner may set token uris".to_string(),
            });
        }
        let token = self.tokens.get_mut(&token_id).ok_or(BadgeError::NotFound {
            what: format!("raft token {token_id}"),
        })?;
        token.metadata_uri = uri.into();
        debug!(%token_id, "raft token uri updated");
        Ok(())
    }

    /// Pause public minting. Registry-owner-gated.
    pub fn pause(&mut self, caller: Address) -> Result<(), BadgeError> {
        self.set_paused(caller, true)
    }

    /// Resume public minting. Registry-owner-gated.
    pub fn unpause(&mut self, caller: Address) -> Result<(), BadgeError> {
        self.set_paused(caller, false)
    }

    fn set_paused(&mut self, caller: Address, paused: bool) -> Result<(), BadgeError> {
        if caller != self.owner {
            return Err(BadgeError::Unauthorized {
                reason: "only the registry owner may pause or unpause".to_string(),
            });
        }
        self.paused = paused;
        Ok(())
    }

    /// Transfer a raft token. The caller must be its current owner.
    ///
    /// No cascading effects on registered specs: they keep their
    /// `registered_by` provenance, and authorization checks resolve
    /// against the new owner from here on.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: RaftTokenId,
    ) -> Result<(), BadgeError> {
        let token = self.tokens.get(&token_id).ok_or(BadgeError::NotFound {
            what: format!("raft token {token_id}"),
        })?;
        if token.owner != from {
            return Err(BadgeError::Unauthorized {
                reason: format!("{from} does not own {token_id}"),
            });
        }
        if caller != from {
            return Err(BadgeError::Unauthorized {
                reason: "caller is not the token owner".to_string(),
            });
        }

        // Checks passed; mutate.
        if let Some(token) = self.tokens.get_mut(&token_id) {
            token.owner = to;
        }
        info!(%token_id, %from, %to, "raft token transferred");
        self.events
            .emit(BadgeEvent::RaftTransferred { token_id, from, to });
        Ok(())
    }

    /// A token's metadata URI, or `NotFound`.
    pub fn token_uri(&self, token_id: RaftTokenId) -> Result<&str, BadgeError> {
        self.tokens
            .get(&token_id)
            .map(|t| t.metadata_uri.as_str())
            .ok_or(BadgeError::NotFound {
                what: format!("raft token {token_id}"),
            })
    }

    /// Number of raft tokens currently owned by `owner`.
    pub fn balance_of(&self, owner: Address) -> usize {
        self.tokens.values().filter(|t| t.owner == owner).count()
    }

    /// Whether public minting is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The registry owner.
    pub fn registry_owner(&self) -> Address {
        self.owner
    }

    /// The events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

impl<S> OwnershipOracle for RaftRegistry<S>
where
    S: KeyValueStore<RaftTokenId, RaftToken>,
{
    fn owner_of(&self, token_id: RaftTokenId) -> Result<Address, BadgeError> {
        self.tokens
            .get(&token_id)
            .map(|t| t.owner)
            .ok_or(BadgeError::NotFound {
                what: format!("raft token {token_id}"),
            })
    }
}
