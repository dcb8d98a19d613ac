use crate::api::{json_body, ApiError, ApiResult, Envelope, ErrorResponse};
use crate::auth::AuthUser;
use crate::models::{Author, Ingredient};
use crate::store::RecipeDraft;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::get::RecipeDetail;

/// Matches the `VARCHAR(255)` column.
pub const MAX_TITLE_CHARS: usize = 255;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub image_urls: Vec<String>,
}

impl CreateRecipeRequest {
    /// Applies the same rules as the create form and trims every field.
    fn into_draft(self) -> Result<RecipeDraft, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::bad_request("Recipe title is required"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ApiError::bad_request(
                "Recipe title must be at most 255 characters",
            ));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(ApiError::bad_request("Recipe description is required"));
        }

        if self.ingredients.is_empty() {
            return Err(ApiError::bad_request("At least one ingredient is required"));
        }
        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for ingredient in &self.ingredients {
            let name = ingredient.name.trim();
            let quantity = ingredient.quantity.trim();
            if name.is_empty() {
                return Err(ApiError::bad_request("Ingredient name is required"));
            }
            if quantity.is_empty() {
                return Err(ApiError::bad_request("Quantity is required"));
            }
            ingredients.push(Ingredient {
                name: name.to_string(),
                quantity: quantity.to_string(),
            });
        }

        let instructions: Vec<String> = self
            .instructions
            .iter()
            .map(|step| step.trim())
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();
        if instructions.is_empty() {
            return Err(ApiError::bad_request("Instructions are required"));
        }

        let image_urls = self
            .image_urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        Ok(RecipeDraft {
            title: title.to_string(),
            description: description.to_string(),
            ingredients,
            instructions,
            image_urls,
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = Envelope<RecipeDetail>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    body: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> ApiResult<RecipeDetail> {
    let draft = json_body(body)?.into_draft()?;

    let recipe = state.store.create_recipe(identity.user_id, &draft).await?;
    tracing::info!(
        recipe_id = recipe.id,
        user_id = identity.user_id,
        "recipe created"
    );

    let author = Author {
        id: identity.user_id,
        username: identity.username,
    };

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Recipe created successfully",
            RecipeDetail::new(recipe, author),
        )),
    ))
}
