use crate::api::{json_body, ApiError, ApiResult, Envelope, ErrorResponse};
use crate::auth::verify_password;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::AuthResponse;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"username": "chef", "password": "password"})),
    responses(
        (status = 200, description = "Login successful", body = Envelope<AuthResponse>),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let req = json_body(body)?;

    let user = match state.store.find_user_by_username(req.username.trim()).await? {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let token = state.sessions.issue(user.id).await?;

    Ok((
        StatusCode::OK,
        Json(Envelope::ok(
            "Login successful",
            AuthResponse {
                user_id: user.id.to_string(),
                username: user.username,
                token,
            },
        )),
    ))
}
