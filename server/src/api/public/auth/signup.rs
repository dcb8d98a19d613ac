use crate::api::{json_body, ApiError, ApiResult, Envelope, ErrorResponse};
use crate::auth::hash_password;
use crate::store::StoreError;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::AuthResponse;

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(ApiError::bad_request(
            "Username must be between 3 and 32 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::bad_request(
            "Username may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body(content = SignupRequest, example = json!({"username": "chef", "password": "password"})),
    responses(
        (status = 201, description = "User created successfully", body = Envelope<AuthResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let req = json_body(body)?;
    let username = req.username.trim();

    validate_username(username)?;
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string().into()))?;

    let user = match state.store.create_user(username, &password_hash).await {
        Ok(u) => u,
        Err(StoreError::Conflict) => {
            return Err(ApiError::Conflict("Username already exists".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.sessions.issue(user.id).await?;
    tracing::info!(user_id = user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "User created successfully",
            AuthResponse {
                user_id: user.id.to_string(),
                username: user.username,
                token,
            },
        )),
    ))
}
