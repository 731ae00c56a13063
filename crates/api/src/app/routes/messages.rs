//! Message routes. Sender and receiver are both eligible owners, so the
//! participant check is the same ownership comparison every other resource
//! uses.

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
    ResourceKind::new("message")
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_messages))
        .route("/:id", get(get_message))
}

pub async fn list_messages(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    let filter = services.evaluator.can_list(actor.actor(), &kind());
    Json(services.messages.list(filter)).into_response()
}

pub async fn get_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<RecordId>,
) -> axum::response::Response {
    let Some(message) = services.messages.find(|row| row.id == id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "no such message");
    };

    if let Err(resp) = authz::guard_record(
        &services.evaluator,
        actor.actor(),
        &kind(),
        RecordAction::Read,
        &message,
    ) {
        return resp;
    }

    Json(message).into_response()
}
