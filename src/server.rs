//!
//! studyNest HTTP server
//! ---------------------
//! Axum-based REST API for assignments, submissions, marking and tasks.
//!
//! Responsibilities:
//! - Session issuance (`POST /jwt`) and logout via the `token` cookie.
//! - The authentication gate, applied as a route layer to every mutating or
//!   owner-scoped endpoint; public reads bypass it.
//! - Ownership checks inline in handlers (see `identity::authorizer`).
//! - Pass-through document reads and writes against the `DocumentStore`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post, put};
use axum::{middleware, Router};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::identity::{CookiePolicy, TokenCodec};
use crate::storage::{Document, DocumentStore, MemoryStore, ID_FIELD};

pub mod gate;
mod extract;
mod session_routes;
mod assignments;
mod submissions;
mod tasks;

pub const ASSIGNMENTS: &str = "assignments";
pub const SUBMITTED_ASSIGNMENTS: &str = "submittedAssignments";
pub const MARKED_ASSIGNMENTS: &str = "markedAssignment";
pub const TASKS: &str = "tasks";

/// Shared server state injected into all handlers.
///
/// Everything here is read-only after startup apart from the store, which
/// synchronises internally.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenCodec>,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: TokenCodec, cookies: CookiePolicy) -> Self {
        Self { store, tokens: Arc::new(tokens), cookies }
    }

    /// Open the configured store and build the codec and cookie policy.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &cfg.data_file {
            Some(path) => Arc::new(
                MemoryStore::open(path).with_context(|| format!("While opening data file: {}", path.display()))?,
            ),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(store, TokenCodec::new(cfg.token_secret.as_bytes()), CookiePolicy::new(cfg.production)))
    }
}

/// Owner email a caller asserts for a mutation (`?email=`).
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub email: Option<String>,
}

/// Create bodies never choose the stored id; the store assigns it.
fn without_client_id(mut doc: Document) -> Document {
    doc.remove(ID_FIELD);
    doc
}

/// Mount all routes. The gate wraps only the second router.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(|| async { "studyNest making server is running" }))
        .route("/jwt", post(session_routes::issue))
        .route("/logout", post(session_routes::logout))
        .route("/assignments", get(assignments::list))
        .route("/assignmentsCount", get(assignments::count))
        .route("/assignment-details/{id}", get(assignments::details))
        .route("/submitted-assignment", get(submissions::list_submitted))
        .route("/submitted-assignment/{id}", get(submissions::submitted_details));

    let gated = Router::new()
        .route("/marked-assignment", get(submissions::list_marked).post(submissions::create_marked))
        .route("/assignments", post(assignments::create))
        .route("/updated-assignment/{id}", put(assignments::update))
        .route("/delete-assignment/{id}", delete(assignments::remove))
        .route("/submitted-assignment", post(submissions::create_submitted))
        .route("/submitted-assignment/{id}", patch(submissions::update_status))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/{id}", put(tasks::update).delete(tasks::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), gate::require_principal));

    public.merge(gated).with_state(state)
}

/// CORS for the front-end origins. Credentials are allowed so the cookie travels.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid allowed origin: {}", o)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Start the studyNest HTTP server with the given configuration.
pub async fn run(cfg: Config) -> anyhow::Result<()> {
    info!(
        target: "startup",
        "studyNest starting: http_port={}, production={}, allowed_origins={:?}, data_file={:?}",
        cfg.http_port, cfg.production, cfg.allowed_origins, cfg.data_file
    );
    let state = AppState::from_config(&cfg)?;
    let app = build_router(state)
        .layer(cors_layer(&cfg.allowed_origins)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", cfg.http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("studyNest server is running on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
