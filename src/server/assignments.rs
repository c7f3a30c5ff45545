use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::extract::{Json, Query};
use super::{without_client_id, AppState, OwnerQuery, ASSIGNMENTS};
use crate::error::{ApiError, ApiResult};
use crate::identity::{asserted_owner, delete_owned, stamp_owner, update_owned, Authenticated};
use crate::storage::{Document, Filter, FindOptions, InsertResult, UpdateResult};

/// Fields an owner may change through `PUT /updated-assignment/{id}`.
const EDITABLE_FIELDS: [&str; 6] = ["title", "desc", "marks", "photo", "dLevel", "date"];

#[derive(Debug, Default, Deserialize)]
pub(super) struct PageQuery {
    page: Option<u64>,
    size: Option<u64>,
}

impl PageQuery {
    fn find_options(&self) -> FindOptions {
        match self.size.filter(|s| *s > 0) {
            Some(size) => FindOptions { skip: Some(self.page.unwrap_or(0).saturating_mul(size)), limit: Some(size) },
            None => FindOptions::default(),
        }
    }
}

/// Keep only the whitelisted keys of an update body.
pub(super) fn editable_patch(body: Document, fields: &[&str]) -> ApiResult<Document> {
    let patch: Document = body.into_iter().filter(|(k, _)| fields.contains(&k.as_str())).collect();
    if patch.is_empty() {
        return Err(ApiError::bad_request(format!("expected at least one of: {}", fields.join(", "))));
    }
    Ok(patch)
}

pub(super) async fn list(State(state): State<AppState>, Query(q): Query<PageQuery>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.store.find(ASSIGNMENTS, &Filter::new(), q.find_options())?))
}

pub(super) async fn count(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = state.store.count(ASSIGNMENTS)?;
    Ok(Json(json!({ "count": count })))
}

pub(super) async fn details(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Option<Document>>> {
    Ok(Json(state.store.find_one(ASSIGNMENTS, &Filter::by_id(&id))?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(doc): Json<Document>,
) -> ApiResult<Json<InsertResult>> {
    let mut doc = without_client_id(doc);
    stamp_owner(auth.principal(), &mut doc)?;
    let res = state.store.insert_one(ASSIGNMENTS, doc)?;
    info!(target: "studynest::assignments", owner = %auth.principal().email(), id = %res.inserted_id, "assignment created");
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
    Ok(Json(update_owned(state.store.as_ref(), ASSIGNMENTS, &id, owner, patch)?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(q): Query<OwnerQuery>,
) -> ApiResult<Json<Document>> {
    let owner = asserted_owner(auth.principal(), q.email.as_deref())?;
    let deleted = delete_owned(state.store.as_ref(), ASSIGNMENTS, &id, owner)?;
    info!(target: "studynest::assignments", owner, id = %id, "assignment deleted");
    Ok(Json(deleted))
}
