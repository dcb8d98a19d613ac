use crate::api::{parse_recipe_id, ApiError, ApiResult, Envelope, ErrorResponse};
use crate::models::{Author, Ingredient, Recipe};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::UserSummary;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub recipe_id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
}

impl RecipeDetail {
    pub fn new(recipe: Recipe, author: Author) -> Self {
        let ingredients = recipe.ingredient_list();
        Self {
            recipe_id: recipe.id.to_string(),
            title: recipe.title,
            description: recipe.description,
            ingredients,
            instructions: recipe.instructions,
            image_urls: recipe.image_urls,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
            user: author.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{recipeId}",
    tag = "recipes",
    params(
        ("recipeId" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = Envelope<RecipeDetail>),
        (status = 400, description = "Invalid recipe ID", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> ApiResult<RecipeDetail> {
    let recipe_id = parse_recipe_id(&recipe_id)?;

    let (recipe, author) = state
        .store
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok((
        StatusCode::OK,
        Json(Envelope::ok(
            "Recipe fetched successfully",
            RecipeDetail::new(recipe, author),
        )),
    ))
}
