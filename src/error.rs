//! Unified API error model and HTTP mapping.
//! Handlers and middleware return `ApiError`; it renders as a JSON body
//! `{ "code": ..., "message": ... }` with the matching status code.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::error;

use crate::storage::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiError {
    /// Missing, invalid or expired session credential.
    Unauthorized { code: String, message: String },
    /// Authenticated, but acting on another principal's data.
    Forbidden { code: String, message: String },
    /// No document matched both the id and the owner.
    NotFoundForOwner { code: String, message: String },
    BadRequest { code: String, message: String },
    Internal { code: String, message: String },
}

impl ApiError {
    pub fn code_str(&self) -> &str {
        match self {
            ApiError::Unauthorized { code, .. }
            | ApiError::Forbidden { code, .. }
            | ApiError::NotFoundForOwner { code, .. }
            | ApiError::BadRequest { code, .. }
            | ApiError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::NotFoundForOwner { message, .. }
            | ApiError::BadRequest { message, .. }
            | ApiError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized { code: "unauthorized".into(), message: "unauthorized access".into() }
    }
    pub fn forbidden() -> Self {
        ApiError::Forbidden { code: "forbidden".into(), message: "forbidden access".into() }
    }
    pub fn not_found_for_owner() -> Self {
        ApiError::NotFoundForOwner {
            code: "not_found_for_owner".into(),
            message: "not found for the requesting user".into(),
        }
    }
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest { code: "bad_request".into(), message: msg.into() }
    }
    pub fn internal() -> Self {
        ApiError::Internal { code: "internal".into(), message: "internal server error".into() }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFoundForOwner { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Store detail stays in the log; clients get a generic message
        error!(target: "studynest::store", "store operation failed: {err}");
        ApiError::internal()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { ApiError::bad_request(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { ApiError::bad_request(rejection.body_text()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": self.code_str(),
            "message": self.message(),
        });
        (self.http_status(), Json(body)).into_response()
    }
}
