//! Board routes. Boards are globally shared among privileged roles and have
//! no owner, so listing is either everything or nothing.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use crewdesk_auth::ResourceKind;
use crewdesk_core::RecordId;

use crate::app::services::{AppServices, Board};
use crate::authz;
use crate::context::ActorContext;

fn kind() -> ResourceKind {
    ResourceKind::new("board")
}

pub fn router() -> Router {
    Router::new().route("/", get(list_boards).post(create_board))
}

pub async fn list_boards(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    let filter = services.evaluator.can_list(actor.actor(), &kind());
    Json(services.boards.list(filter)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
}

pub async fn create_board(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<CreateBoardRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::guard_create(&services.evaluator, actor.actor(), &kind()) {
        return resp;
    }

    let board = Board {
        id: RecordId::new(),
        name: body.name,
        created_at: Utc::now(),
    };
    services.boards.push(board.clone());

    (StatusCode::CREATED, Json(board)).into_response()
}
