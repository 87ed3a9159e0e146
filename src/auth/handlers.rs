use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{SigninRequest, SigninResponse, SignupRequest},
        services::{AuthError, AuthService},
    },
    response::{ApiError, ApiResponse},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidInput(msg) => ApiError::BadRequest(msg.into()),
            AuthError::PasswordMismatch => ApiError::BadRequest(e.to_string()),
            AuthError::DuplicateEmail => ApiError::Conflict(e.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            AuthError::Store(inner) => ApiError::internal("server error", inner),
            AuthError::Hash(inner) => ApiError::internal("registration failed", inner),
            AuthError::Token(inner) => ApiError::internal("failed to issue token", inner),
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!(error = %e, "rejected request body");
        ApiError::BadRequest("invalid JSON body".into())
    })
}

#[instrument(skip(auth, payload))]
pub async fn signup(
    State(auth): State<AuthService>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let req = json_body(payload)?;
    auth.signup(req).await?;
    Ok(ApiResponse::created("user created"))
}

#[instrument(skip(auth, payload))]
pub async fn signin(
    State(auth): State<AuthService>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<ApiResponse<SigninResponse>, ApiError> {
    let req = json_body(payload)?;
    let res = auth.signin(req).await?;
    Ok(ApiResponse::ok(res))
}
