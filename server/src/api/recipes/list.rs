use crate::api::{parse_id, ApiError, ApiResult, Envelope, ErrorResponse, PageParams, Pagination};
use crate::models::{Author, Recipe};
use crate::store::Page;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::UserSummary;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    /// Only show recipes posted by this user
    pub user_id: Option<String>,
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
}

impl FeedParams {
    fn page(&self) -> Page {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
        .resolve(DEFAULT_LIMIT, MAX_LIMIT)
    }
}

/// A recipe card in the feed: the first image stands in for the gallery.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub recipe_id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

impl FeedEntry {
    fn new(recipe: Recipe, author: Author) -> Self {
        Self {
            recipe_id: recipe.id.to_string(),
            title: recipe.title,
            description: recipe.description,
            image: recipe.image_urls.into_iter().next(),
            created_at: recipe.created_at,
            user: author.into(),
        }
    }
}

async fn feed(state: &AppState, owner: Option<i32>, page: Page) -> ApiResult<Vec<FeedEntry>> {
    let paged = state.store.list_recipes(owner, page).await?;
    let entries = paged
        .items
        .into_iter()
        .map(|(recipe, author)| FeedEntry::new(recipe, author))
        .collect();

    Ok((
        StatusCode::OK,
        Json(
            Envelope::ok("Recipes fetched successfully", entries)
                .with_pagination(Pagination::new(page, paged.total)),
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(FeedParams),
    responses(
        (status = 200, description = "Recipe feed, newest first", body = Envelope<Vec<FeedEntry>>),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    query: Result<Query<FeedParams>, QueryRejection>,
) -> ApiResult<Vec<FeedEntry>> {
    let Query(params) =
        query.map_err(|_| ApiError::bad_request("Invalid pagination parameters"))?;

    let owner = params
        .user_id
        .as_deref()
        .map(|raw| parse_id(raw, "Invalid user ID"))
        .transpose()?;

    feed(&state, owner, params.page()).await
}

#[utoipa::path(
    get,
    path = "/api/users/{userId}/recipes",
    tag = "recipes",
    params(
        ("userId" = i32, Path, description = "User ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "Recipes posted by the user, newest first", body = Envelope<Vec<FeedEntry>>),
        (status = 400, description = "Invalid user ID", body = ErrorResponse)
    )
)]
pub async fn list_user_recipes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Vec<FeedEntry>> {
    let user_id = parse_id(&user_id, "Invalid user ID")?;
    let page = PageParams::from_query(query)?.resolve(DEFAULT_LIMIT, MAX_LIMIT);

    feed(&state, Some(user_id), page).await
}
