use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::extract::{Json, Query};
use super::{without_client_id, AppState, OwnerQuery, MARKED_ASSIGNMENTS, SUBMITTED_ASSIGNMENTS};
use crate::error::ApiResult;
use crate::identity::{ensure_same_principal, Authenticated, EXAMINEE_FIELD};
use crate::storage::{Document, Filter, FindOptions, InsertResult, UpdateOptions, UpdateResult};

const STATUS_FIELD: &str = "statusValue";

#[derive(Debug, Default, Deserialize)]
pub(super) struct StatusQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusPayload {
    #[serde(rename = "statusValue")]
    status_value: Value,
}

pub(super) async fn list_submitted(State(state): State<AppState>, Query(q): Query<StatusQuery>) -> ApiResult<Json<Vec<Document>>> {
    let filter = match q.status {
        Some(status) => Filter::new().eq(STATUS_FIELD, status),
        None => Filter::new(),
    };
    Ok(Json(state.store.find(SUBMITTED_ASSIGNMENTS, &filter, FindOptions::default())?))
}

pub(super) async fn submitted_details(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Option<Document>>> {
    Ok(Json(state.store.find_one(SUBMITTED_ASSIGNMENTS, &Filter::by_id(&id))?))
}

pub(super) async fn create_submitted(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(doc): Json<Document>,
) -> ApiResult<Json<InsertResult>> {
    let res = state.store.insert_one(SUBMITTED_ASSIGNMENTS, without_client_id(doc))?;
    info!(target: "studynest::submissions", by = %auth.principal().email(), id = %res.inserted_id, "submission stored");
    Ok(Json(res))
}

/// Set the review status of a submission. Any signed-in examiner may do this.
pub(super) async fn update_status(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> ApiResult<Json<UpdateResult>> {
    let mut patch = Document::new();
    patch.insert(STATUS_FIELD.to_string(), payload.status_value);
    let res = state.store.update_one(SUBMITTED_ASSIGNMENTS, &Filter::by_id(&id), patch, UpdateOptions::default())?;
    info!(target: "studynest::submissions", by = %auth.principal().email(), id = %id, matched = res.matched_count, "submission status updated");
    Ok(Json(res))
}

/// Marked items of the caller. The `email` query must be the caller's own.
pub(super) async fn list_marked(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(q): Query<OwnerQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    ensure_same_principal(auth.principal(), q.email.as_deref())?;
    let filter = Filter::new().eq(EXAMINEE_FIELD, auth.principal().email());
    Ok(Json(state.store.find(MARKED_ASSIGNMENTS, &filter, FindOptions::default())?))
}

pub(super) async fn create_marked(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(doc): Json<Document>,
) -> ApiResult<Json<InsertResult>> {
    let res = state.store.insert_one(MARKED_ASSIGNMENTS, without_client_id(doc))?;
    info!(target: "studynest::submissions", by = %auth.principal().email(), id = %res.inserted_id, "mark recorded");
    Ok(Json(res))
}
