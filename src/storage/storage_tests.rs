use super::*;
use serde_json::json;

fn doc(v: serde_json::Value) -> Document {
    v.as_object().cloned().unwrap()
}

#[test]
fn test_insert_assigns_id_and_find_one_by_id() {
    let store = MemoryStore::new();
    let res = store.insert_one("assignments", doc(json!({"title": "Essay", "email": "a@x.com"}))).unwrap();
    assert!(res.acknowledged);
    assert!(!res.inserted_id.is_empty());
    let found = store.find_one("assignments", &Filter::by_id(&res.inserted_id)).unwrap().unwrap();
    assert_eq!(found.get("title"), Some(&json!("Essay")));
    assert_eq!(found.get(ID_FIELD), Some(&json!(res.inserted_id)));
}

#[test]
fn test_insert_rejects_duplicate_id() {
    let store = MemoryStore::new();
    store.insert_one("tasks", doc(json!({"_id": "t1"}))).unwrap();
    let err = store.insert_one("tasks", doc(json!({"_id": "t1"}))).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn test_find_filters_on_every_clause_and_paginates() {
    let store = MemoryStore::new();
    for i in 0..6 {
        let email = if i % 2 == 0 { "a@x.com" } else { "b@x.com" };
        store.insert_one("assignments", doc(json!({"n": i, "email": email}))).unwrap();
    }
    let mine = store.find("assignments", &Filter::new().eq("email", "a@x.com"), FindOptions::default()).unwrap();
    let ns: Vec<i64> = mine.iter().map(|d| d["n"].as_i64().unwrap()).collect();
    assert_eq!(ns, vec![0, 2, 4]);

    let page = store.find("assignments", &Filter::new(), FindOptions { skip: Some(2), limit: Some(3) }).unwrap();
    let ns: Vec<i64> = page.iter().map(|d| d["n"].as_i64().unwrap()).collect();
    assert_eq!(ns, vec![2, 3, 4]);

    let none = store.find("assignments", &Filter::new().eq("email", "a@x.com").eq("n", 1), FindOptions::default()).unwrap();
    assert!(none.is_empty());
    assert_eq!(store.count("assignments").unwrap(), 6);
    assert_eq!(store.count("missing").unwrap(), 0);
}

#[test]
fn test_update_one_sets_fields_and_reports_counts() {
    let store = MemoryStore::new();
    let id = store.insert_one("submitted", doc(json!({"statusValue": "pending"}))).unwrap().inserted_id;

    let res = store
        .update_one("submitted", &Filter::by_id(&id), doc(json!({"statusValue": "completed"})), UpdateOptions::default())
        .unwrap();
    assert_eq!((res.matched_count, res.modified_count), (1, 1));

    // Same value again: matched but not modified
    let res = store
        .update_one("submitted", &Filter::by_id(&id), doc(json!({"statusValue": "completed"})), UpdateOptions::default())
        .unwrap();
    assert_eq!((res.matched_count, res.modified_count), (1, 0));

    let res = store
        .update_one("submitted", &Filter::by_id("nope"), doc(json!({"statusValue": "x"})), UpdateOptions::default())
        .unwrap();
    assert_eq!((res.matched_count, res.modified_count, res.upserted_id), (0, 0, None));
}

#[test]
fn test_update_one_upsert_builds_document_from_filter_and_patch() {
    let store = MemoryStore::new();
    let res = store
        .update_one(
            "assignments",
            &Filter::by_id("fixed-id").eq("email", "a@x.com"),
            doc(json!({"title": "New", "_id": "ignored"})),
            UpdateOptions { upsert: true },
        )
        .unwrap();
    assert_eq!(res.upserted_id.as_deref(), Some("fixed-id"));
    let stored = store.find_one("assignments", &Filter::by_id("fixed-id")).unwrap().unwrap();
    assert_eq!(stored.get("email"), Some(&json!("a@x.com")));
    assert_eq!(stored.get("title"), Some(&json!("New")));
}

#[test]
fn test_find_one_and_delete_removes_only_the_match() {
    let store = MemoryStore::new();
    store.insert_one("tasks", doc(json!({"_id": "1", "email": "a@x.com"}))).unwrap();
    store.insert_one("tasks", doc(json!({"_id": "2", "email": "b@x.com"}))).unwrap();

    let miss = store.find_one_and_delete("tasks", &Filter::by_id("2").eq("email", "a@x.com")).unwrap();
    assert!(miss.is_none());
    assert_eq!(store.count("tasks").unwrap(), 2);

    let hit = store.find_one_and_delete("tasks", &Filter::by_id("2").eq("email", "b@x.com")).unwrap().unwrap();
    assert_eq!(hit.get("email"), Some(&json!("b@x.com")));
    assert_eq!(store.count("tasks").unwrap(), 1);
}

#[test]
fn test_snapshot_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("data").join("studynest.json");
    {
        let store = MemoryStore::open(&path).unwrap();
        store.insert_one("assignments", doc(json!({"_id": "keep", "title": "Essay"}))).unwrap();
        store.insert_one("assignments", doc(json!({"_id": "drop"}))).unwrap();
        store.find_one_and_delete("assignments", &Filter::by_id("drop")).unwrap();
    }
    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.count("assignments").unwrap(), 1);
    let kept = reopened.find_one("assignments", &Filter::by_id("keep")).unwrap().unwrap();
    assert_eq!(kept.get("title"), Some(&json!("Essay")));
}

#[test]
fn test_concurrent_writers_leave_newest_snapshot_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("studynest.json");
    let store = std::sync::Arc::new(MemoryStore::open(&path).unwrap());
    let writers: Vec<_> = (0..8)
        .map(|w| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..10 {
                    store.insert_one("tasks", doc(json!({"_id": format!("{w}-{i}")}))).unwrap();
                    store.count("tasks").unwrap();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    drop(store);
    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.count("tasks").unwrap(), 80);
}

#[test]
fn test_open_rejects_corrupt_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("broken.json");
    std::fs::write(&path, b"{not json").unwrap();
    assert!(matches!(MemoryStore::open(&path), Err(StoreError::Serde(_))));
}
