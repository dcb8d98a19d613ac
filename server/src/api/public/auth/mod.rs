pub mod login;
pub mod signup;

use serde::Serialize;
use utoipa::ToSchema;

/// Returned by both signup and login: the new session's bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: String,
    pub username: String,
    pub token: String,
}
