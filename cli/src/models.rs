//! Wire types for the FoodieGram HTTP API, as the client sees them.

use serde::{Deserialize, Serialize};

/// Success envelope. `data` is always present on 2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<Vec<T>> {
    /// Items on the server, not just in this page.
    pub fn total(&self) -> i64 {
        self.pagination
            .map_or(self.data.len() as i64, |page| page.total)
    }
}

/// Error envelope: `{success: false, message}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub recipe_id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub recipe_id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub content: String,
    pub created_at: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub recipe_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummary {
    pub likes: i64,
    pub has_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: String,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PingStatus {
    pub status: String,
}
