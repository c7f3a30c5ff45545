use axum::extract::{Path, State};
use tracing::info;

use super::assignments::editable_patch;
use super::extract::{Json, Query};
use super::{without_client_id, AppState, OwnerQuery, TASKS};
use crate::error::ApiResult;
use crate::identity::{asserted_owner, delete_owned, stamp_owner, update_owned, Authenticated, OWNER_FIELD};
use crate::storage::{Document, Filter, FindOptions, InsertResult, UpdateResult};

const EDITABLE_FIELDS: [&str; 4] = ["title", "description", "status", "dueDate"];

/// The caller's own tasks, oldest first.
pub(super) async fn list(State(state): State<AppState>, auth: Authenticated) -> ApiResult<Json<Vec<Document>>> {
    let filter = Filter::new().eq(OWNER_FIELD, auth.principal().email());
    Ok(Json(state.store.find(TASKS, &filter, FindOptions::default())?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(doc): Json<Document>,
) -> ApiResult<Json<InsertResult>> {
    let mut doc = without_client_id(doc);
    stamp_owner(auth.principal(), &mut doc)?;
    let res = state.store.insert_one(TASKS, doc)?;
    info!(target: "studynest::tasks", owner = %auth.principal().email(), id = %res.inserted_id, "task created");
    Ok(Json(res))
}

pub(super) async fn update(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(q): Query<OwnerQuery>,
    Json(body): Json<Document>,
) -> ApiResult<Json<UpdateResult>> {
    let owner = asserted_owner(auth.principal(), q.email.as_deref())?;
    let patch = editable_patch(body, &EDITABLE_FIELDS)?;
    Ok(Json(update_owned(state.store.as_ref(), TASKS, &id, owner, patch)?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(q): Query<OwnerQuery>,
) -> ApiResult<Json<Document>> {
    let owner = asserted_owner(auth.principal(), q.email.as_deref())?;
    let deleted = delete_owned(state.store.as_ref(), TASKS, &id, owner)?;
    info!(target: "studynest::tasks", owner, id = %id, "task deleted");
    Ok(Json(deleted))
}
