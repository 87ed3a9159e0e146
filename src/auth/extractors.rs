use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::error;

use super::claims::AuthContext;
use crate::response::ApiError;

/// Identity of the caller, placed in the request by the auth gate.
pub struct AuthUser(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                // Route was mounted outside the gate.
                error!("AuthContext missing from request extensions");
                ApiError::Unauthorized("authentication required".into())
            })
    }
}
