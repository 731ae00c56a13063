use axum::{Router, routing::get};

pub mod boards;
pub mod invoices;
pub mod messages;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/boards", boards::router())
        .nest("/invoices", invoices::router())
        .nest("/messages", messages::router())
}
