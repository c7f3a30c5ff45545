//! Ownership checks applied inline by handlers.
//!
//! There is a single rule: the authenticated principal's email must equal the
//! owner field of the data being read or changed. Reads compare against the
//! email the caller claims in the query; mutations additionally require the
//! stored document's owner field to match inside the store filter, so a
//! foreign document is never touched and is reported exactly like a missing one.

use serde_json::Value;
use tracing::debug;

use super::Principal;
use crate::error::{ApiError, ApiResult};
use crate::storage::{Document, DocumentStore, Filter, UpdateOptions, UpdateResult};

/// Owner field on assignments and tasks.
pub const OWNER_FIELD: &str = "email";
/// Owner field on marked (graded) submissions.
pub const EXAMINEE_FIELD: &str = "ExamineeEmail";

/// Owner-scoped read: the claimed email must be present and be the caller's own.
pub fn ensure_same_principal(principal: &Principal, claimed: Option<&str>) -> ApiResult<()> {
    match claimed {
        Some(email) if email == principal.email() => Ok(()),
        other => {
            debug!(target: "studynest::authz", caller = %principal.email(), claimed = ?other, "owner-scoped read denied");
            Err(ApiError::forbidden())
        }
    }
}

/// Owner asserted for a mutation. Defaults to the caller; asserting someone else is forbidden.
pub fn asserted_owner<'a>(principal: &'a Principal, asserted: Option<&'a str>) -> ApiResult<&'a str> {
    let owner = asserted.unwrap_or(principal.email());
    if owner != principal.email() {
        debug!(target: "studynest::authz", caller = %principal.email(), asserted = %owner, "mutation on behalf of another owner denied");
        return Err(ApiError::forbidden());
    }
    Ok(owner)
}

/// Filter matching a document by id only when it belongs to `owner`.
pub fn owner_filter(id: &str, owner: &str) -> Filter { Filter::by_id(id).eq(OWNER_FIELD, owner) }

/// Set the owner field on a new document, or check the one the client supplied.
pub fn stamp_owner(principal: &Principal, doc: &mut Document) -> ApiResult<()> {
    match doc.get(OWNER_FIELD) {
        None | Some(Value::Null) => {
            doc.insert(OWNER_FIELD.to_string(), Value::String(principal.email().to_string()));
            Ok(())
        }
        Some(Value::String(email)) if email == principal.email() => Ok(()),
        Some(Value::String(_)) => {
            debug!(target: "studynest::authz", caller = %principal.email(), "create on behalf of another owner denied");
            Err(ApiError::forbidden())
        }
        Some(_) => Err(ApiError::bad_request("email must be a string")),
    }
}

/// Delete a document only if it matches both `id` and `owner`.
pub fn delete_owned(store: &dyn DocumentStore, collection: &str, id: &str, owner: &str) -> ApiResult<Document> {
    match store.find_one_and_delete(collection, &owner_filter(id, owner))? {
        Some(doc) => Ok(doc),
        None => {
            debug!(target: "studynest::authz", collection, id, owner, "delete matched no owned document");
            Err(ApiError::not_found_for_owner())
        }
    }
}

/// Apply `patch` to a document only if it matches both `id` and `owner`. Never upserts.
pub fn update_owned(store: &dyn DocumentStore, collection: &str, id: &str, owner: &str, patch: Document) -> ApiResult<UpdateResult> {
    let res = store.update_one(collection, &owner_filter(id, owner), patch, UpdateOptions { upsert: false })?;
    if res.matched_count == 0 {
        debug!(target: "studynest::authz", collection, id, owner, "update matched no owned document");
        return Err(ApiError::not_found_for_owner());
    }
    Ok(res)
}
