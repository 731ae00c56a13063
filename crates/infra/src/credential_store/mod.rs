//! Credential store adapters.
//!
//! The port ([`crewdesk_auth::CredentialStore`]) lives with its consumer in
//! the auth crate; this module provides the in-memory (dev/test) and
//! Postgres adapters.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryCredentialStore, IssuedCredential};
pub use postgres::PgCredentialStore;
