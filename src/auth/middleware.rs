//! Auth gate for protected routes.
//!
//! Wrapped around a router with `middleware::from_fn_with_state(keys, require_auth)`.
//! A request gets through only with `Authorization: Bearer <valid token>`; the
//! verified identity is left in the request extensions as [`AuthContext`].

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::{
    claims::AuthContext,
    jwt::{JwtKeys, TokenError},
};
use crate::response::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Why the gate refused a request. The token sub-reason is kept for the log
/// and never rendered.
#[derive(Debug, thiserror::Error)]
pub enum GateRejection {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("invalid Authorization header format")]
    MalformedCredential,
    #[error("invalid or expired token")]
    InvalidToken(#[source] TokenError),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        ApiError::Unauthorized(self.to_string()).into_response()
    }
}

pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<AuthContext, GateRejection> {
    let header = headers.get(AUTHORIZATION).ok_or_else(|| {
        warn!("missing Authorization header");
        GateRejection::MissingHeader
    })?;

    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            warn!("Authorization header without Bearer prefix");
            GateRejection::MalformedCredential
        })?;

    let claims = keys.verify(token).map_err(|e| {
        warn!(reason = %e, "token rejected");
        GateRejection::InvalidToken(e)
    })?;

    debug!(email = %claims.sub, "request authenticated");
    Ok(claims.into())
}

pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let ctx = authenticate(req.headers(), &keys)?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
