//! `crewdesk-auth` — authentication/authorization core for the portal.
//!
//! This crate is intentionally decoupled from HTTP and storage: transports
//! hand in the raw bearer credential, storage implements [`CredentialStore`],
//! and everything else here is pure policy.
//!
//! Per-request flow: [`TokenAuthenticator::authenticate`] resolves the
//! credential to an [`Actor`], then the [`PolicyEvaluator`] decides each
//! (actor, resource kind, action, record) tuple against the [`PolicyTable`]
//! loaded and validated at startup.

pub mod actor;
pub mod authenticator;
pub mod credential;
pub mod evaluator;
pub mod policy;
pub mod role;

pub use actor::{Actor, ActorDisplay, ActorRecord};
pub use authenticator::{AuthError, CredentialStore, CredentialStoreError, TokenAuthenticator};
pub use credential::{CredentialHash, TokenHasher, HASH_SIZE};
pub use evaluator::{Decision, DecisionExplanation, PolicyEvaluator, RoleEffect, RowFilter};
pub use policy::{
    Action, Effect, OwnedRecord, Ownership, OwnershipMode, PolicyConfig, PolicyConfigError,
    PolicyTable, RecordAction, ResourceKind, ResourcePolicyConfig,
};
pub use role::{Role, RoleRegistry};
