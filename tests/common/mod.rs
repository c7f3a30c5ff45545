//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use studynest::identity::{CookiePolicy, TokenCodec};
use studynest::server::{build_router, AppState};
use studynest::storage::{Document, DocumentStore, MemoryStore};

pub const SECRET: &[u8] = b"integration-secret";

pub fn app_with(production: bool) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), TokenCodec::new(SECRET), CookiePolicy::new(production));
    (build_router(state), store)
}

pub fn app() -> (Router, Arc<MemoryStore>) { app_with(false) }

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn set_cookie(&self) -> String {
        self.headers.get(header::SET_COOKIE).expect("set-cookie header").to_str().unwrap().to_string()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Reply {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Reply { status, headers, body }
}

/// Issue a session and return the `token=...` pair a browser would send back.
pub async fn login(app: &Router, email: &str) -> String {
    let reply = send(app, request("POST", "/jwt", None, Some(serde_json::json!({ "email": email })))).await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.set_cookie().split(';').next().unwrap().trim().to_string()
}

pub fn seed(store: &MemoryStore, collection: &str, doc: Value) -> String {
    let doc: Document = doc.as_object().cloned().expect("object");
    store.insert_one(collection, doc).unwrap().inserted_id
}
