//! Infrastructure layer: credential-store adapters and policy configuration.

pub mod config;
pub mod credential_store;

pub use config::{PolicyLoadError, load_policy};
pub use credential_store::{InMemoryCredentialStore, IssuedCredential, PgCredentialStore};
