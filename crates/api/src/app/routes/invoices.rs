//! Invoice routes. An invoice is owned by the billed client; clients see
//! only their own rows, staff roles see all of them.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crewdesk_auth::{RecordAction, ResourceKind};
use crewdesk_core::RecordId;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::ActorContext;

fn kind() -> ResourceKind {
    ResourceKind::new("invoice")
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices))
        .route("/:id", get(get_invoice))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    // The filter goes into the store as a query constraint; rows the actor
    // may not list are never materialized here.
    let filter = services.evaluator.can_list(actor.actor(), &kind());
    Json(services.invoices.list(filter)).into_response()
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<RecordId>,
) -> axum::response::Response {
    let Some(invoice) = services.invoices.find(|row| row.id == id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "no such invoice");
    };

    if let Err(resp) = authz::guard_record(
        &services.evaluator,
        actor.actor(),
        &kind(),
        RecordAction::Read,
        &invoice,
    ) {
        return resp;
    }

    Json(invoice).into_response()
}
