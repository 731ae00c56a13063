//! Bearer-token authentication against the credential store.

use async_trait::async_trait;
use thiserror::Error;

use crate::actor::{Actor, ActorRecord};
use crate::credential::{CredentialHash, TokenHasher};

/// Failure surface of the credential store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// The store could not be reached or the query failed.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// The store returned data it should never contain (e.g. an undecodable
    /// stored digest).
    #[error("credential store returned corrupt data: {0}")]
    Corrupt(String),
}

/// Read-only lookup port into the credential store.
///
/// Returns every record whose stored digest indexes to `hash` (normally
/// zero or one). Returning all candidates keeps the "one credential, one
/// actor" invariant observable by the authenticator instead of silently
/// resolving a collision to the first match.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_credential_hash(
        &self,
        hash: &CredentialHash,
    ) -> Result<Vec<ActorRecord>, CredentialStoreError>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    async fn find_by_credential_hash(
        &self,
        hash: &CredentialHash,
    ) -> Result<Vec<ActorRecord>, CredentialStoreError> {
        (**self).find_by_credential_hash(hash).await
    }
}

/// Authentication failure taxonomy.
///
/// `MissingCredential` and `InvalidCredential` both surface as 401 at the
/// transport boundary but are logged differently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no bearer credential (or an empty one).
    #[error("missing credential")]
    MissingCredential,

    /// The credential hashed to no stored record.
    #[error("invalid credential")]
    InvalidCredential,

    /// Transient credential-store failure. Retrying is the caller's policy,
    /// never this crate's.
    #[error("authentication unavailable: {0}")]
    AuthUnavailable(String),

    /// The store violated an invariant: a digest shared by several actors, a
    /// role-less record, or corrupt stored data. A configuration fault, not
    /// a per-request condition.
    #[error("credential store invariant violated: {0}")]
    StoreInvariant(String),
}

/// Resolves raw bearer credentials to authenticated actors.
///
/// Stateless across requests: each call recomputes the digest and performs a
/// single store read, so concurrent authentications share nothing mutable
/// and cannot observe each other.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator<S> {
    store: S,
    hasher: TokenHasher,
}

impl<S: CredentialStore> TokenAuthenticator<S> {
    pub fn new(store: S, hasher: TokenHasher) -> Self {
        Self { store, hasher }
    }

    /// Authenticate the verbatim bearer credential of a request.
    ///
    /// `None` or an effectively empty string is [`AuthError::MissingCredential`];
    /// a credential that matches no stored record is
    /// [`AuthError::InvalidCredential`]. Candidates returned by the store are
    /// re-verified against the computed digest in constant time.
    pub async fn authenticate(&self, raw: Option<&str>) -> Result<Actor, AuthError> {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r,
            _ => {
                tracing::debug!("authentication attempt without a credential");
                return Err(AuthError::MissingCredential);
            }
        };

        let hash = self.hasher.hash(raw);

        let candidates = self
            .store
            .find_by_credential_hash(&hash)
            .await
            .map_err(|e| match e {
                CredentialStoreError::Unavailable(msg) => AuthError::AuthUnavailable(msg),
                CredentialStoreError::Corrupt(msg) => AuthError::StoreInvariant(msg),
            })?;

        // The store's own index is not trusted to compare digests; equality
        // on `CredentialHash` is constant-time.
        let mut matched: Vec<ActorRecord> = candidates
            .into_iter()
            .filter(|record| record.credential_hash == hash)
            .collect();

        if matched.len() > 1 {
            tracing::error!(
                matches = matched.len(),
                "credential digest is shared by multiple actors"
            );
            return Err(AuthError::StoreInvariant(format!(
                "credential digest matches {} actors",
                matched.len()
            )));
        }

        let Some(record) = matched.pop() else {
            tracing::warn!("credential matched no stored record");
            return Err(AuthError::InvalidCredential);
        };

        let actor_id = record.id;
        let actor = record.into_actor().map_err(|e| {
            tracing::error!(actor_id = %actor_id, "stored actor record is invalid: {e}");
            AuthError::StoreInvariant(format!("actor {actor_id}: {e}"))
        })?;

        tracing::debug!(actor_id = %actor.id(), "authenticated actor");
        Ok(actor)
    }
}
