//! `crewdesk-api` — HTTP boundary for the portal core.
//!
//! Authentication and authorization decisions are produced by
//! `crewdesk-auth`; this crate only translates them to transport responses
//! (401/403) and pushes row filters into the read stores. It emits no
//! decision of its own.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
