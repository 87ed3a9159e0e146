use serde::{Deserialize, Serialize};

/// Request body for signup. Missing fields deserialize as empty strings so
/// they are reported as invalid input rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for signin.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// `data` of a successful signin.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    pub name: String,
}
