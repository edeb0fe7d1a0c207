//! # Protocol Events
//!
//! Each registry keeps an ordered log of the events its mutations emit,
//! the way a contract deployment emits logs for downstream indexers. The
//! log is append-only; a failed operation appends nothing.

use serde::{Deserialize, Serialize};

use badges_core::{Address, CredentialId, RaftTokenId, SpecUri, Timestamp};
use badges_crypto::{LeafHash, MerkleRoot};

use crate::credential::RevocationReason;

/// An event emitted by a protocol mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeEvent {
    /// An authority token was minted.
    RaftMinted {
        /// The new token id.
        token_id: RaftTokenId,
        /// The recipient.
        to: Address,
        /// The metadata URI.
        uri: String,
    },
    /// An authority token changed hands.
    RaftTransferred {
        /// The token.
        token_id: RaftTokenId,
        /// Previous owner.
        from: Address,
        /// New owner.
        to: Address,
    },
    /// A spec was registered.
    SpecCreated {
        /// The registering address.
        to: Address,
        /// The spec's unique key.
        spec_uri: SpecUri,
        /// The raft token the spec is bound to.
        raft_token_id: RaftTokenId,
        /// Address of the authority registry at registration time, if wired.
        raft_registry_address: Option<Address>,
    },
    /// A credential was minted.
    CredentialMinted {
        /// The deterministic credential id.
        credential_id: CredentialId,
        /// The claimant the badge is bound to.
        to: Address,
        /// The spec the badge was minted against.
        spec_uri: SpecUri,
    },
    /// A credential was revoked.
    CredentialRevoked {
        /// The credential.
        credential_id: CredentialId,
        /// Why it was revoked.
        reason: RevocationReason,
    },
    /// A revoked credential was reinstated.
    CredentialReinstated {
        /// The credential.
        credential_id: CredentialId,
    },
    /// A merkle leaf was consumed against a committed root.
    LeafUsed {
        /// The committed root.
        root: MerkleRoot,
        /// The consumed leaf.
        leaf: LeafHash,
    },
    /// Downstream indexers should re-fetch metadata for these specs.
    MetadataRefreshRequested {
        /// The specs to refresh.
        spec_uris: Vec<SpecUri>,
    },
}

/// A timestamped event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// When the event was emitted.
    pub at: Timestamp,
    /// The event.
    pub event: BadgeEvent,
}

/// An append-only, ordered event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog(Vec<EventRecord>);

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an event, stamped with the current time.
    pub fn emit(&mut self, event: BadgeEvent) {
        self.0.push(EventRecord {
            at: Timestamp::now(),
            event,
        });
    }

    /// All records in emission order.
    pub fn records(&self) -> &[EventRecord] {
        &self.0
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_appends_in_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.emit(BadgeEvent::RaftMinted {
            token_id: RaftTokenId(1),
            to: Address::from_bytes([1u8; 20]),
            uri: "ipfs://org".to_string(),
        });
        log.emit(BadgeEvent::RaftTransferred {
            token_id: RaftTokenId(1),
            from: Address::from_bytes([1u8; 20]),
            to: Address::from_bytes([2u8; 20]),
        });

        assert_eq!(log.len(), 2);
        assert!(matches!(
            log.records()[0].event,
            BadgeEvent::RaftMinted { .. }
        ));
        assert!(matches!(
            log.records()[1].event,
            BadgeEvent::RaftTransferred { .. }
        ));
    }

    #[test]
    fn records_serialize() {
        let mut log = EventLog::new();
        log.emit(BadgeEvent::MetadataRefreshRequested {
            spec_uris: vec![SpecUri::new("ipfs://cred-A").unwrap()],
        });
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("MetadataRefreshRequested"));
    }
}
