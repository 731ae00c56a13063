//! In-memory credential store (dev/test) plus token issuance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crewdesk_auth::{
    ActorDisplay, ActorRecord, CredentialHash, CredentialStore, CredentialStoreError, Role,
    TokenHasher,
};
use crewdesk_core::ActorId;

/// A freshly issued credential.
///
/// `raw` is the only copy of the token that will ever exist; the store keeps
/// the digest.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub actor_id: ActorId,
    pub raw: String,
}

/// HashMap-backed store, safe for concurrent readers.
pub struct InMemoryCredentialStore {
    hasher: TokenHasher,
    records: RwLock<HashMap<ActorId, ActorRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new(hasher: TokenHasher) -> Self {
        Self {
            hasher,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a credential for a new or existing actor, replacing any prior
    /// one (rotation). The raw token is returned exactly once and never
    /// stored.
    pub fn issue(
        &self,
        actor_id: ActorId,
        roles: Vec<Role>,
        display: ActorDisplay,
    ) -> Result<IssuedCredential, CredentialStoreError> {
        let raw = mint_token()?;
        let record = ActorRecord {
            id: actor_id,
            credential_hash: self.hasher.hash(&raw),
            roles,
            display,
        };

        let mut records = self
            .records
            .write()
            .map_err(|_| CredentialStoreError::Unavailable("store lock poisoned".to_string()))?;
        records.insert(actor_id, record);

        Ok(IssuedCredential { actor_id, raw })
    }

    /// Insert a pre-hashed record verbatim (test seeding).
    pub fn insert(&self, record: ActorRecord) -> Result<(), CredentialStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CredentialStoreError::Unavailable("store lock poisoned".to_string()))?;
        records.insert(record.id, record);
        Ok(())
    }

    pub fn remove(&self, actor_id: ActorId) -> Result<(), CredentialStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CredentialStoreError::Unavailable("store lock poisoned".to_string()))?;
        records.remove(&actor_id);
        Ok(())
    }
}

fn mint_token() -> Result<String, CredentialStoreError> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| CredentialStoreError::Unavailable(format!("token entropy: {e}")))?;
    Ok(hex::encode(bytes))
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_credential_hash(
        &self,
        hash: &CredentialHash,
    ) -> Result<Vec<ActorRecord>, CredentialStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| CredentialStoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(records
            .values()
            .filter(|record| &record.credential_hash == hash)
            .cloned()
            .collect())
    }
}
