use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::extract::Json;
use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;

#[derive(Debug, Deserialize)]
pub(super) struct IssuePayload {
    #[serde(default)]
    email: String,
}

/// Exchange a claimed email for a signed credential stored in the `token` cookie.
/// The claim itself is trusted; the token never appears in the body.
pub(super) async fn issue(State(state): State<AppState>, Json(payload): Json<IssuePayload>) -> ApiResult<impl IntoResponse> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    let principal = Principal::new(email);
    let token = state.tokens.sign(&principal).map_err(|e| {
        error!(target: "studynest::auth", "could not sign session token: {e}");
        ApiError::internal()
    })?;
    let cookie = state.cookies.issue(&token).map_err(|e| {
        error!(target: "studynest::auth", "could not encode session cookie: {e}");
        ApiError::internal()
    })?;
    info!(target: "studynest::auth", email = %principal.email(), "session issued");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Json(json!({"success": true}))))
}

/// Tell the client to drop its credential. No server-side state exists to clear.
pub(super) async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!(target: "studynest::auth", "logging out");
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, state.cookies.clear());
    (headers, Json(json!({"success": true})))
}
