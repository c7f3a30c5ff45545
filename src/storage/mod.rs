//!
//! studyNest storage module
//! ------------------------
//! Document storage used by the HTTP handlers. Documents are JSON objects kept
//! in named collections, each carrying a string `_id`. Filters are conjunctions
//! of field equalities, which is all the handlers need (`_id`, owner email,
//! status value).
//!
//! The handlers only see the `DocumentStore` trait; `MemoryStore` is the
//! bundled implementation and can persist a JSON snapshot between restarts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod memory;
mod snapshot;

pub use memory::MemoryStore;

/// A stored document: a JSON object with a string `_id`.
pub type Document = serde_json::Map<String, Value>;

/// Field holding the unique document identifier.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate document id: {0}")]
    Conflict(String),
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Structural-equality predicate: every clause must match the document field exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self { Self::default() }

    pub fn by_id(id: &str) -> Self { Self::new().eq(ID_FIELD, id) }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] { &self.clauses }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(field, value)| doc.get(field) == Some(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Insert a document built from the filter and patch when nothing matches.
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

/// Primitive document operations over named collections.
///
/// Single-document update and delete are atomic with respect to other calls
/// on the same store.
pub trait DocumentStore: Send + Sync {
    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Matching documents in insertion order, after applying skip then limit.
    fn find(&self, collection: &str, filter: &Filter, opts: FindOptions) -> StoreResult<Vec<Document>>;

    fn count(&self, collection: &str) -> StoreResult<u64>;

    /// Insert a document, assigning a fresh `_id` when it has none.
    fn insert_one(&self, collection: &str, doc: Document) -> StoreResult<InsertResult>;

    /// Apply `$set` semantics: each patch key overwrites the stored field.
    fn update_one(&self, collection: &str, filter: &Filter, patch: Document, opts: UpdateOptions) -> StoreResult<UpdateResult>;

    fn find_one_and_delete(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod storage_tests;
