//! # badges-registry — Protocol State and Minting
//!
//! The stateful half of the badge protocol. Where `badges-agreement` is
//! pure digest computation, this crate holds the registries a deployment
//! mutates:
//!
//! - **Authority registry** (`raft`): transferable authority tokens whose
//!   ownership is the credential for registering specs and managing badge
//!   lifecycles. Implements the [`OwnershipOracle`] every authorization
//!   check resolves through.
//! - **Spec registry** (`spec`): one registration per spec URI, bound to a
//!   raft token; two-phase peer-address wire-up for mutually-referencing
//!   deployments.
//! - **Credential ledger** (`credential`): minted badges and their
//!   revoke/reinstate state machine.
//! - **Leaf gate** (`allowlist`): per-(root, leaf) single-use tracking for
//!   batch minting.
//! - **Dispatcher** (`dispatcher`): the four minting entry points plus
//!   maintenance hooks, composing all of the above.
//!
//! ## Execution Model
//!
//! Operations are synchronous and atomic: every check runs before the
//! first state mutation, so a failed call leaves all state exactly as it
//! was. There is no internal concurrency, retry, or timer machinery — the
//! caller owns ordering.
//!
//! ## State Injection
//!
//! Registries do not own ambient global maps. Each takes a
//! [`KeyValueStore`](store::KeyValueStore) handle through its constructor,
//! scoped to that component's lifetime.

pub mod allowlist;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod raft;
pub mod spec;
pub mod store;

// Re-export primary types.
pub use allowlist::LeafGate;
pub use credential::{credential_id_for, Credential, CredentialLedger, RevocationReason};
pub use dispatcher::BadgeDispatcher;
pub use error::BadgeError;
pub use event::{BadgeEvent, EventLog, EventRecord};
pub use raft::{OwnershipOracle, RaftRegistry, RaftToken};
pub use spec::{SpecLookup, SpecRecord, SpecRegistry};
pub use store::{KeyValueStore, MemoryStore};
