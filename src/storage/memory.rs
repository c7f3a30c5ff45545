use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::debug;

use super::{
    snapshot, Document, DocumentStore, Filter, FindOptions, InsertResult, StoreError, StoreResult, UpdateOptions,
    UpdateResult, ID_FIELD,
};

pub(super) type Collections = HashMap<String, Vec<Document>>;

/// In-memory document store. Collections keep insertion order.
///
/// When opened with a snapshot path, the whole store is rewritten to that file
/// after every mutation and reloaded on the next `open`. The copy is taken
/// under the collection lock; the file is written after it is released.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    snapshot: Option<Snapshotter>,
}

/// Orders snapshot writes. `generation` only advances under the collection
/// write lock; `written` is the newest generation on disk.
struct Snapshotter {
    path: PathBuf,
    generation: AtomicU64,
    written: Mutex<u64>,
}

/// A copy of the store taken at a given generation, waiting to be written.
struct Pending {
    generation: u64,
    collections: Collections,
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new() }
}

fn new_id() -> String { uuid::Uuid::new_v4().simple().to_string() }

fn id_of(doc: &Document) -> Option<String> {
    match doc.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { collections: RwLock::new(HashMap::new()), snapshot: None }
    }

    /// Open a store backed by a snapshot file, loading it when it exists.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let collections = snapshot::load(&path)?;
        debug!(target: "studynest::storage", "opened snapshot '{}' with {} collections", path.display(), collections.len());
        let snapshot = Snapshotter { path, generation: AtomicU64::new(0), written: Mutex::new(0) };
        Ok(Self { collections: RwLock::new(collections), snapshot: Some(snapshot) })
    }

    /// Copy the collections for a later write. Call with the write lock held.
    fn capture(&self, collections: &Collections) -> Option<Pending> {
        let snap = self.snapshot.as_ref()?;
        let generation = snap.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Some(Pending { generation, collections: collections.clone() })
    }

    /// Write a captured copy unless a newer one already reached disk.
    fn flush(&self, pending: Option<Pending>) -> StoreResult<()> {
        let (Some(snap), Some(pending)) = (&self.snapshot, pending) else { return Ok(()) };
        let mut written = snap.written.lock();
        if pending.generation <= *written {
            return Ok(());
        }
        snapshot::save(&snap.path, &pending.collections)?;
        *written = pending.generation;
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let map = self.collections.read();
        Ok(map.get(collection).and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    fn find(&self, collection: &str, filter: &Filter, opts: FindOptions) -> StoreResult<Vec<Document>> {
        let map = self.collections.read();
        let Some(docs) = map.get(collection) else { return Ok(Vec::new()); };
        let skip = opts.skip.unwrap_or(0) as usize;
        let limit = opts.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(docs.iter().filter(|d| filter.matches(d)).skip(skip).take(limit).cloned().collect())
    }

    fn count(&self, collection: &str) -> StoreResult<u64> {
        let map = self.collections.read();
        Ok(map.get(collection).map(|docs| docs.len() as u64).unwrap_or(0))
    }

    fn insert_one(&self, collection: &str, mut doc: Document) -> StoreResult<InsertResult> {
        let id = id_of(&doc).unwrap_or_else(new_id);
        let mut map = self.collections.write();
        let docs = map.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| id_of(d).as_deref() == Some(id.as_str())) {
            return Err(StoreError::Conflict(format!("{collection}/{id}")));
        }
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        docs.push(doc);
        let pending = self.capture(&map);
        drop(map);
        self.flush(pending)?;
        debug!(target: "studynest::storage", "insert_one: collection='{}' id='{}'", collection, id);
        Ok(InsertResult { acknowledged: true, inserted_id: id })
    }

    fn update_one(&self, collection: &str, filter: &Filter, patch: Document, opts: UpdateOptions) -> StoreResult<UpdateResult> {
        let mut map = self.collections.write();
        let docs = map.entry(collection.to_string()).or_default();

        if let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) {
            let mut modified = false;
            for (key, value) in patch {
                if key == ID_FIELD { continue; }
                if doc.get(&key) != Some(&value) {
                    doc.insert(key, value);
                    modified = true;
                }
            }
            if modified {
                let pending = self.capture(&map);
                drop(map);
                self.flush(pending)?;
            }
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }

        if !opts.upsert {
            return Ok(UpdateResult { acknowledged: true, matched_count: 0, modified_count: 0, upserted_id: None });
        }

        // Upsert: seed from the equality clauses, then apply the patch
        let mut doc = Document::new();
        for (field, value) in filter.clauses() {
            doc.insert(field.clone(), value.clone());
        }
        for (key, value) in patch {
            if key == ID_FIELD { continue; }
            doc.insert(key, value);
        }
        let id = id_of(&doc).unwrap_or_else(new_id);
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        docs.push(doc);
        let pending = self.capture(&map);
        drop(map);
        self.flush(pending)?;
        debug!(target: "studynest::storage", "update_one: upserted collection='{}' id='{}'", collection, id);
        Ok(UpdateResult { acknowledged: true, matched_count: 0, modified_count: 0, upserted_id: Some(id) })
    }

    fn find_one_and_delete(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let mut map = self.collections.write();
        let Some(docs) = map.get_mut(collection) else { return Ok(None); };
        let Some(pos) = docs.iter().position(|d| filter.matches(d)) else { return Ok(None); };
        let removed = docs.remove(pos);
        let pending = self.capture(&map);
        drop(map);
        self.flush(pending)?;
        Ok(Some(removed))
    }
}
