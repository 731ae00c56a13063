use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crewdesk_auth::{AuthError, CredentialStore, TokenAuthenticator};

use crate::app::errors::json_error;
use crate::context::ActorContext;

/// Shared authentication state for the middleware layer.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<TokenAuthenticator<Arc<dyn CredentialStore>>>,
}

/// Authenticate the request's bearer credential and attach the resolved
/// actor as a request extension. Policy evaluation never runs for a request
/// that fails here.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let raw = bearer_token(req.headers());

    let actor = state
        .authenticator
        .authenticate(raw)
        .await
        .map_err(auth_error_response)?;

    req.extensions_mut().insert(ActorContext::new(actor));

    Ok(next.run(req).await)
}

/// Raw bearer token from the Authorization header, if any.
///
/// A present-but-empty token is reported as absent so it authenticates as a
/// missing credential, not an invalid one.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Map authentication failures to transport responses.
///
/// Missing and invalid credentials share one 401 body; the distinction
/// lives only in the authenticator's logs.
fn auth_error_response(err: AuthError) -> Response {
    match err {
        AuthError::MissingCredential | AuthError::InvalidCredential => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        AuthError::AuthUnavailable(msg) => {
            tracing::error!("credential store unavailable: {msg}");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "auth_unavailable",
                "authentication temporarily unavailable",
            )
        }
        AuthError::StoreInvariant(msg) => {
            tracing::error!("credential store invariant violated: {msg}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "auth_invariant",
                "authentication misconfigured",
            )
        }
    }
}
