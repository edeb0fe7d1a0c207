//! # Credential Ledger — Badges and Their Revocation State Machine
//!
//! Minted badges are non-transferable: a credential is bound to its
//! claimant forever, and the only post-mint mutations are the lifecycle
//! toggles.
//!
//! ## States
//!
//! ```text
//! Unminted ──▶ Valid ──▶ Revoked ──▶ Valid (reinstated) ──▶ Revoked ──▶ ...
//! ```
//!
//! `Valid` and `Revoked` are the only post-mint states; alternation is
//! unlimited and neither is terminal. Revocation is a status flag with a
//! reason code, not token removal.
//!
//! ## Authorization
//!
//! Revoke and reinstate are gated on *current* ownership of the raft token
//! that the credential's spec is bound to, resolved through the injected
//! [`OwnershipOracle`] at call time.

use serde::{Deserialize, Serialize};
use tracing::info;

use badges_core::{sha256_digest, Address, CanonicalBytes, CredentialId, RaftTokenId, SpecUri};

use crate::error::BadgeError;
use crate::event::{BadgeEvent, EventLog};
use crate::raft::OwnershipOracle;
use crate::spec::SpecLookup;
use crate::store::{KeyValueStore, MemoryStore};

/// Why a credential was revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevocationReason {
    /// The holder abused the credential.
    Abuse,
    /// The holder left the issuing organization.
    Departed,
    /// The credential's tenure ended.
    TenureEnded,
    /// Unspecified.
    Other,
}

impl RevocationReason {
    /// The wire code for this reason.
    pub fn code(&self) -> u8 {
        match self {
            Self::Abuse => 0,
            Self::Departed => 1,
            Self::TenureEnded => 2,
            Self::Other => 3,
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Abuse),
            1 => Some(Self::Departed),
            2 => Some(Self::TenureEnded),
            3 => Some(Self::Other),
            _ => None,
        }
    }
}

/// A minted, non-transferable credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The claimant the badge is permanently bound to.
    pub owner: Address,
    /// The spec the badge was minted against.
    pub spec_uri: SpecUri,
    /// Whether the credential is currently valid.
    pub valid: bool,
    /// Set while revoked, cleared on reinstatement.
    pub revocation_reason: Option<RevocationReason>,
}

/// The claim a credential id is derived from: the `(recipient, specUri)`
/// projection of the signed agreement.
#[derive(Serialize)]
struct Claim<'a> {
    to: Address,
    #[serde(rename = "tokenURI")]
    token_uri: &'a SpecUri,
}

/// Derive the deterministic credential id for a `(recipient, specUri)` pair.
///
/// The id is the SHA-256 digest of the canonical claim. Deliberately
/// independent of which raft owner signed: a fresh signature from a new
/// owner for an already-minted claim collides to the same id and fails as
/// `TokenExists` rather than double-minting.
pub fn credential_id_for(to: Address, spec_uri: &SpecUri) -> Result<CredentialId, BadgeError> {
    let claim = Claim {
        to,
        token_uri: spec_uri,
    };
    let canonical = CanonicalBytes::new(&claim)?;
    Ok(CredentialId::from_digest(sha256_digest(&canonical)))
}

/// The credential store and its lifecycle operations.
#[derive(Debug)]
pub struct CredentialLedger<S = MemoryStore<CredentialId, Credential>>
where
    S: KeyValueStore<CredentialId, Credential>,
{
    credentials: S,
    events: EventLog,
}

impl CredentialLedger {
    /// Create a ledger with the default in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for CredentialLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CredentialLedger<S>
where
    S: KeyValueStore<CredentialId, Credential>,
{
    /// Create a ledger backed by an injected store.
    pub fn with_store(credentials: S) -> Self {
        Self {
            credentials,
            events: EventLog::new(),
        }
    }

    /// Record a freshly minted credential.
    ///
    /// Internal: only the dispatcher's verified entry points mint. Fails
    /// with `TokenExists` on id collision.
    pub(crate) fn mint(
        &mut self,
        credential_id: CredentialId,
        owner: Address,
        spec_uri: SpecUri,
    ) -> Result<(), BadgeError> {
        if self.credentials.contains(&credential_id) {
            return Err(BadgeError::TokenExists { credential_id });
        }
        self.credentials.insert(
            credential_id,
            Credential {
                owner,
                spec_uri: spec_uri.clone(),
                valid: true,
                revocation_reason: None,
            },
        );
        info!(%credential_id, %owner, %spec_uri, "credential minted");
        self.events.emit(BadgeEvent::CredentialMinted {
            credential_id,
            to: owner,
            spec_uri,
        });
        Ok(())
    }

    /// Revoke a credential.
    ///
    /// The caller must currently own the raft token that the credential's
    /// spec is bound to. Fails with `NotFound` for unknown credentials and
    /// `AlreadyRevoked` if the credential is already revoked.
    pub fn revoke(
        &mut self,
        caller: Address,
        raft_token_id: RaftTokenId,
        credential_id: CredentialId,
        reason: RevocationReason,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<(), BadgeError> {
        let credential = self.require(credential_id)?;
        authorize(caller, raft_token_id, credential, oracle, specs)?;
        if !credential.valid {
            return Err(BadgeError::AlreadyRevoked { credential_id });
        }

        // Checks passed; mutate.
        if let Some(credential) = self.credentials.get_mut(&credential_id) {
            credential.valid = false;
            credential.revocation_reason = Some(reason);
        }
        info!(%credential_id, ?reason, "credential revoked");
        self.events.emit(BadgeEvent::CredentialRevoked {
            credential_id,
            reason,
        });
        Ok(())
    }

    /// Reinstate a revoked credential, clearing its reason.
    ///
    /// Same authorization as [`revoke()`](Self::revoke). Fails with
    /// `NotRevoked` if the credential is currently valid.
    pub fn reinstate(
        &mut self,
        caller: Address,
        raft_token_id: RaftTokenId,
        credential_id: CredentialId,
        oracle: &dyn OwnershipOracle,
        specs: &dyn SpecLookup,
    ) -> Result<(), BadgeError> {
        let credential = self.require(credential_id)?;
        authorize(caller, raft_token_id, credential, oracle, specs)?;
        if credential.valid {
            return Err(BadgeError::NotRevoked { credential_id });
        }

        if let Some(credential) = self.credentials.get_mut(&credential_id) {
            credential.valid = true;
            credential.revocation_reason = None;
        }
        info!(%credential_id, "credential reinstated");
        self.events
            .emit(BadgeEvent::CredentialReinstated { credential_id });
        Ok(())
    }

    /// Whether a credential is currently valid.
    pub fn is_valid(&self, credential_id: CredentialId) -> Result<bool, BadgeError> {
        Ok(self.require(credential_id)?.valid)
    }

    /// The claimant a credential is bound to.
    pub fn owner_of(&self, credential_id: CredentialId) -> Result<Address, BadgeError> {
        Ok(self.require(credential_id)?.owner)
    }

    /// The spec URI a credential was minted against.
    pub fn token_uri(&self, credential_id: CredentialId) -> Result<&SpecUri, BadgeError> {
        Ok(&self.require(credential_id)?.spec_uri)
    }

    /// Full credential record, if minted.
    pub fn credential(&self, credential_id: CredentialId) -> Option<&Credential> {
        self.credentials.get(&credential_id)
    }

    /// Number of credentials bound to `owner`.
    pub fn balance_of(&self, owner: Address) -> usize {
        self.credentials
            .values()
            .filter(|c| c.owner == owner)
            .count()
    }

    /// Whether a credential id has been minted.
    pub fn exists(&self, credential_id: CredentialId) -> bool {
        self.credentials.contains(&credential_id)
    }

    /// The events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn require(&self, credential_id: CredentialId) -> Result<&Credential, BadgeError> {
        self.credentials
            .get(&credential_id)
            .ok_or(BadgeError::NotFound {
                what: format!("credential {credential_id}"),
            })
    }
}

/// Authorize a lifecycle mutation: the caller must currently own the raft
/// token, and that token must be the one the credential's spec is bound to.
fn authorize(
    caller: Address,
    raft_token_id: RaftTokenId,
    credential: &Credential,
    oracle: &dyn OwnershipOracle,
    specs: &dyn SpecLookup,
) -> Result<(), BadgeError> {
    let record = specs
        .spec_record(&credential.spec_uri)
        .ok_or_else(|| BadgeError::NotFound {
            what: format!("spec {}", credential.spec_uri),
        })?;
    if record.raft_token_id != raft_token_id {
        return Err(BadgeError::Unauthorized {
            reason: format!(
                "{raft_token_id} does not control spec {}",
                credential.spec_uri
            ),
        });
    }
    let raft_owner = oracle.owner_of(raft_token_id)?;
    if caller != raft_owner {
        return Err(BadgeError::Unauthorized {
            reason: format!("caller does not own {raft_token_id}"),
        });
    }
    Ok(())
}
