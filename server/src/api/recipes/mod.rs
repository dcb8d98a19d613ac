pub mod comments;
pub mod create;
pub mod get;
pub mod likes;
pub mod list;

use crate::models::Author;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/{recipe_id}", get(get::get_recipe))
        .route(
            "/{recipe_id}/comment",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/{recipe_id}/like", post(likes::create_like))
        .route("/{recipe_id}/likes", get(likes::get_likes))
}

/// The user attached to a recipe or comment.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
}

impl From<Author> for UserSummary {
    fn from(author: Author) -> Self {
        Self {
            user_id: author.id.to_string(),
            username: author.username,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        list::list_user_recipes,
        get::get_recipe,
        comments::create_comment,
        comments::list_comments,
        likes::create_like,
        likes::get_likes,
    ),
    components(schemas(
        UserSummary,
        create::CreateRecipeRequest,
        get::RecipeDetail,
        list::FeedEntry,
        comments::CommentRequest,
        comments::CommentResponse,
        comments::CommentWithUser,
        likes::LikeSummaryResponse,
        crate::models::Like,
    ))
)]
pub struct ApiDoc;
