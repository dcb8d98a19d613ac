use crate::api::{parse_recipe_id, ApiError, ApiResult, Envelope, ErrorResponse};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::models::Like;
use crate::store::LikeOutcome;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummaryResponse {
    pub likes: i64,
    /// False for anonymous callers
    pub has_liked: bool,
}

/// Like a recipe. Repeating the call is a no-op that returns the existing like.
#[utoipa::path(
    post,
    path = "/api/recipes/{recipeId}/like",
    tag = "interactions",
    params(
        ("recipeId" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Like added successfully", body = Envelope<Like>),
        (status = 200, description = "Recipe already liked", body = Envelope<Like>),
        (status = 400, description = "Invalid recipe ID", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_like(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> ApiResult<Like> {
    let recipe_id = parse_recipe_id(&recipe_id)?;

    if !state.store.recipe_exists(recipe_id).await? {
        return Err(ApiError::not_found("Recipe not found"));
    }

    match state.store.add_like(identity.user_id, recipe_id).await? {
        LikeOutcome::Created(like) => {
            tracing::info!(recipe_id, user_id = identity.user_id, "recipe liked");
            Ok((
                StatusCode::CREATED,
                Json(Envelope::ok("Like added successfully", like)),
            ))
        }
        LikeOutcome::AlreadyLiked(like) => Ok((
            StatusCode::OK,
            Json(Envelope::ok("Recipe already liked", like)),
        )),
    }
}

/// Like count for a recipe, plus whether the caller has liked it
#[utoipa::path(
    get,
    path = "/api/recipes/{recipeId}/likes",
    tag = "interactions",
    params(
        ("recipeId" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Likes fetched successfully", body = Envelope<LikeSummaryResponse>),
        (status = 400, description = "Invalid recipe ID", body = ErrorResponse)
    )
)]
pub async fn get_likes(
    MaybeAuthUser(identity): MaybeAuthUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> ApiResult<LikeSummaryResponse> {
    let recipe_id = parse_recipe_id(&recipe_id)?;

    let summary = state
        .store
        .like_summary(recipe_id, identity.map(|i| i.user_id))
        .await?;

    Ok((
        StatusCode::OK,
        Json(Envelope::ok(
            "Likes fetched successfully",
            LikeSummaryResponse {
                likes: summary.likes,
                has_liked: summary.has_liked,
            },
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;
    use serde_json::json;

    #[tokio::test]
    async fn test_like_is_idempotent() {
        let app = TestApp::new();
        let (user_id, token) = app.user("yara").await;
        let recipe_id = app.recipe(user_id, "Tagine").await;
        let uri = format!("/api/recipes/{recipe_id}/like");

        let (status, first) = app.post(&uri, Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["message"], "Like added successfully");
        assert_eq!(first["data"]["userId"], user_id);
        assert_eq!(first["data"]["recipeId"], recipe_id);

        let (status, second) = app.post(&uri, Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["message"], "Recipe already liked");
        assert_eq!(second["data"]["id"], first["data"]["id"]);
        assert_eq!(app.store.like_count(), 1);
    }

    #[tokio::test]
    async fn test_like_missing_recipe_is_404() {
        let app = TestApp::new();
        let (_, token) = app.user("zane").await;

        let (status, body) = app
            .post("/api/recipes/31337/like", Some(&token), json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Recipe not found");
        assert_eq!(app.store.like_count(), 0);
    }

    #[tokio::test]
    async fn test_like_requires_auth() {
        let app = TestApp::new();
        let (user_id, _) = app.user("abe").await;
        let recipe_id = app.recipe(user_id, "Latkes").await;

        let (status, body) = app
            .post(&format!("/api/recipes/{recipe_id}/like"), None, json!({}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");
        assert_eq!(app.store.like_count(), 0);
    }

    #[tokio::test]
    async fn test_like_rejects_bad_recipe_id() {
        let app = TestApp::new();
        let (_, token) = app.user("bea").await;

        let (status, body) = app
            .post("/api/recipes/not-a-number/like", Some(&token), json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid recipe ID");
    }

    #[tokio::test]
    async fn test_like_summary_tracks_viewer() {
        let app = TestApp::new();
        let (owner, owner_token) = app.user("cal").await;
        let (_, fan_token) = app.user("dee").await;
        let recipe_id = app.recipe(owner, "Churros").await;

        app.post(
            &format!("/api/recipes/{recipe_id}/like"),
            Some(&fan_token),
            json!({}),
        )
        .await;

        let uri = format!("/api/recipes/{recipe_id}/likes");

        let (status, body) = app.get(&uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Likes fetched successfully");
        assert_eq!(body["data"], json!({"likes": 1, "hasLiked": false}));

        let (_, body) = app.get(&uri, Some(&fan_token)).await;
        assert_eq!(body["data"]["hasLiked"], true);

        let (_, body) = app.get(&uri, Some(&owner_token)).await;
        assert_eq!(body["data"]["hasLiked"], false);
    }
}
