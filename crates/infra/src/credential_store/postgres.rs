//! Postgres-backed credential store.
//!
//! One indexed lookup per authentication:
//!
//! ```sql
//! SELECT id, display_name, email, roles, credential_hash
//! FROM actors
//! WHERE credential_hash = $1
//! ```
//!
//! `credential_hash` is stored hex-encoded under a unique index; `roles` is
//! a `TEXT[]` column. The unique index makes collisions unlikely to persist,
//! but the authenticator still verifies every returned row.

use core::str::FromStr;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crewdesk_auth::{
    ActorDisplay, ActorRecord, CredentialHash, CredentialStore, CredentialStoreError, Role,
};
use crewdesk_core::ActorId;

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_credential_hash(
        &self,
        hash: &CredentialHash,
    ) -> Result<Vec<ActorRecord>, CredentialStoreError> {
        let rows = sqlx::query(
            "SELECT id, display_name, email, roles, credential_hash \
             FROM actors WHERE credential_hash = $1",
        )
        .bind(hash.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CredentialStoreError::Unavailable(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: uuid::Uuid = row
                .try_get("id")
                .map_err(|e| CredentialStoreError::Corrupt(format!("actors.id: {e}")))?;
            let display_name: String = row
                .try_get("display_name")
                .map_err(|e| CredentialStoreError::Corrupt(format!("actors.display_name: {e}")))?;
            let email: Option<String> = row
                .try_get("email")
                .map_err(|e| CredentialStoreError::Corrupt(format!("actors.email: {e}")))?;
            let role_names: Vec<String> = row
                .try_get("roles")
                .map_err(|e| CredentialStoreError::Corrupt(format!("actors.roles: {e}")))?;
            let stored_hash: String = row
                .try_get("credential_hash")
                .map_err(|e| CredentialStoreError::Corrupt(format!("actors.credential_hash: {e}")))?;

            let credential_hash = CredentialHash::from_str(&stored_hash).map_err(|e| {
                CredentialStoreError::Corrupt(format!("actors.credential_hash: {e}"))
            })?;

            records.push(ActorRecord {
                id: ActorId::from_uuid(id),
                credential_hash,
                roles: role_names.into_iter().map(Role::new).collect(),
                display: ActorDisplay {
                    name: display_name,
                    email,
                },
            });
        }

        Ok(records)
    }
}
