use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::Principal;
use crate::error::ApiError;

/// Principal decoded by the authentication gate for the current request.
///
/// Inserted into request extensions by the gate; handlers behind the gate take
/// it as an extractor. Outside the gate the extractor rejects with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    pub fn principal(&self) -> &Principal { &self.0 }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Authenticated>().cloned().ok_or_else(ApiError::unauthorized)
    }
}
