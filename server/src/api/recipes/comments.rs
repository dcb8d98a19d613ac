use crate::api::{
    json_body, parse_recipe_id, ApiError, ApiResult, Envelope, ErrorResponse, PageParams,
    Pagination,
};
use crate::auth::AuthUser;
use crate::models::Comment;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserSummary;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            comment_id: comment.id.to_string(),
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    pub comment_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
}

/// Add a comment to a recipe
#[utoipa::path(
    post,
    path = "/api/recipes/{recipeId}/comment",
    tag = "interactions",
    params(
        ("recipeId" = i32, Path, description = "Recipe ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added successfully", body = Envelope<CommentResponse>),
        (status = 400, description = "Invalid recipe ID or missing content", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<CommentResponse> {
    let recipe_id = parse_recipe_id(&recipe_id)?;
    let request = json_body(body)?;

    let content = match request.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Err(ApiError::bad_request("Content is required")),
    };

    let comment = state
        .store
        .create_comment(identity.user_id, recipe_id, &content)
        .await?;

    tracing::info!(
        comment_id = comment.id,
        recipe_id,
        user_id = identity.user_id,
        "comment added"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Comment added successfully", comment.into())),
    ))
}

/// List comments on a recipe, oldest first
#[utoipa::path(
    get,
    path = "/api/recipes/{recipeId}/comment",
    tag = "interactions",
    params(
        ("recipeId" = i32, Path, description = "Recipe ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "Comments fetched successfully", body = Envelope<Vec<CommentWithUser>>),
        (status = 400, description = "Invalid recipe ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Vec<CommentWithUser>> {
    let recipe_id = parse_recipe_id(&recipe_id)?;
    let page = PageParams::from_query(query)?.resolve(DEFAULT_LIMIT, MAX_LIMIT);

    let paged = state.store.list_comments(recipe_id, page).await?;
    let comments = paged
        .items
        .into_iter()
        .map(|(comment, author)| CommentWithUser {
            comment_id: comment.id.to_string(),
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            user: author.into(),
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(
            Envelope::ok("Comments fetched successfully", comments)
                .with_pagination(Pagination::new(page, paged.total)),
        ),
    ))
}
