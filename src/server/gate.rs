//! Authentication gate.
//!
//! Runs before every gated handler: reads the `token` cookie, verifies it and
//! attaches the principal to the request. Missing, tampered and expired
//! credentials all produce the same 401 so the client cannot tell which check
//! failed; the reason is only logged.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::AppState;
use crate::error::ApiError;
use crate::identity::{parse_cookie, Authenticated, TOKEN_COOKIE};

pub async fn require_principal(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let Some(token) = parse_cookie(req.headers(), TOKEN_COOKIE) else {
        debug!(target: "studynest::auth", method = %req.method(), path = %req.uri().path(), "rejected: no session cookie");
        return Err(ApiError::unauthorized());
    };
    let principal = match state.tokens.verify(&token) {
        Ok(p) => p,
        Err(reason) => {
            debug!(target: "studynest::auth", method = %req.method(), path = %req.uri().path(), %reason, "rejected: credential failed verification");
            return Err(ApiError::unauthorized());
        }
    };
    req.extensions_mut().insert(Authenticated(principal));
    Ok(next.run(req).await)
}
