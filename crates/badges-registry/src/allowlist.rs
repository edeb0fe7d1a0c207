//! # Leaf Gate — Single-Use Tracking for Batch Minting
//!
//! An issuer's signed merkle agreement authorizes every address under the
//! committed root, but each leaf may redeem only once per root. The gate
//! records consumed `(root, leaf)` pairs; the full address list never
//! touches protocol state.

use tracing::debug;

use badges_crypto::{LeafHash, MerkleRoot};

use crate::error::BadgeError;
use crate::event::{BadgeEvent, EventLog};
use crate::store::{KeyValueStore, MemoryStore};

/// Per-(root, leaf) single-use tracking.
#[derive(Debug)]
pub struct LeafGate<S = MemoryStore<(MerkleRoot, LeafHash), ()>>
where
    S: KeyValueStore<(MerkleRoot, LeafHash), ()>,
{
    used: S,
    events: EventLog,
}

impl LeafGate {
    /// Create a gate with the default in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for LeafGate {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> LeafGate<S>
where
    S: KeyValueStore<(MerkleRoot, LeafHash), ()>,
{
    /// Create a gate backed by an injected store.
    pub fn with_store(used: S) -> Self {
        Self {
            used,
            events: EventLog::new(),
        }
    }

    /// Whether a leaf has been consumed against this root.
    pub fn is_used(&self, root: MerkleRoot, leaf: LeafHash) -> bool {
        self.used.contains(&(root, leaf))
    }

    /// Consume a leaf against a root. Fails with `AlreadyUsed` on repeat.
    pub fn mark_used(&mut self, root: MerkleRoot, leaf: LeafHash) -> Result<(), BadgeError> {
        if self.used.contains(&(root, leaf)) {
            return Err(BadgeError::AlreadyUsed { root, leaf });
        }
        self.used.insert((root, leaf), ());
        debug!(%root, %leaf, "allowlist leaf consumed");
        self.events.emit(BadgeEvent::LeafUsed { root, leaf });
        Ok(())
    }

    /// The events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
