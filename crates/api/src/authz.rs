//! Authorization guards for handlers.
//!
//! Guards run before any business logic touches a record; a `Deny` becomes
//! a 403 response. Handlers that list records never call these; they push
//! the evaluator's row filter into the read store instead.

use axum::http::StatusCode;
use axum::response::Response;

use crewdesk_auth::{Actor, Decision, OwnedRecord, PolicyEvaluator, RecordAction, ResourceKind};

use crate::app::errors::json_error;

fn forbidden() -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", "not permitted")
}

/// Guard creating a record of `kind`.
pub fn guard_create(
    evaluator: &PolicyEvaluator,
    actor: &Actor,
    kind: &ResourceKind,
) -> Result<(), Response> {
    match evaluator.can_create(actor, kind) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::debug!(
                explanation = ?evaluator.explain(actor, kind, crewdesk_auth::Action::Create),
                "create denied"
            );
            Err(forbidden())
        }
    }
}

/// Guard an action against a single record.
pub fn guard_record(
    evaluator: &PolicyEvaluator,
    actor: &Actor,
    kind: &ResourceKind,
    action: RecordAction,
    record: &dyn OwnedRecord,
) -> Result<(), Response> {
    match evaluator.can_act(actor, kind, action, record) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::debug!(
                explanation = ?evaluator.explain(actor, kind, action.into()),
                "action denied"
            );
            Err(forbidden())
        }
    }
}
