//! Persistence gateway.
//!
//! Handlers never touch diesel directly; they talk to a [`Store`]. Production
//! uses [`PgStore`], tests use [`MemoryStore`].

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Author, Comment, Ingredient, Like, Recipe, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("recipe does not exist")]
    RecipeNotFound,

    #[error("conflicting record already exists")]
    Conflict,

    #[error("database connection unavailable: {0}")]
    Pool(String),

    #[error("query failed: {0}")]
    Query(#[source] diesel::result::Error),

    #[error("could not encode value: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => StoreError::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::Conflict,
            other => StoreError::Query(other),
        }
    }
}

/// Offset/limit window, already clamped by the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// One page of rows plus the total number of rows matching the query.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Validated input for a new recipe.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub image_urls: Vec<String>,
}

/// Result of liking a recipe: likes are unique per (user, recipe).
#[derive(Debug, Clone)]
pub enum LikeOutcome {
    Created(Like),
    AlreadyLiked(Like),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSummary {
    pub likes: i64,
    pub has_liked: bool,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Returns [`StoreError::Conflict`] if the username is taken (case-insensitive).
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Case-insensitive lookup that skips soft-deleted users.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn create_session(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Removes `user_id`'s sessions that expired at or before `now`.
    async fn delete_expired_sessions(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    /// The owner of an unexpired session, unless that user has been deleted.
    async fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Author>, StoreError>;

    async fn create_recipe(&self, user_id: i32, draft: &RecipeDraft) -> Result<Recipe, StoreError>;

    async fn get_recipe(&self, recipe_id: i32) -> Result<Option<(Recipe, Author)>, StoreError>;

    async fn recipe_exists(&self, recipe_id: i32) -> Result<bool, StoreError>;

    /// Newest first. `owner` restricts the feed to one user's recipes.
    async fn list_recipes(
        &self,
        owner: Option<i32>,
        page: Page,
    ) -> Result<Paged<(Recipe, Author)>, StoreError>;

    /// Returns [`StoreError::RecipeNotFound`] if the recipe does not exist.
    async fn create_comment(
        &self,
        user_id: i32,
        recipe_id: i32,
        content: &str,
    ) -> Result<Comment, StoreError>;

    /// Insertion order. An unknown recipe simply has no comments.
    async fn list_comments(
        &self,
        recipe_id: i32,
        page: Page,
    ) -> Result<Paged<(Comment, Author)>, StoreError>;

    /// Idempotent: a second like from the same user returns the existing row.
    async fn add_like(&self, user_id: i32, recipe_id: i32) -> Result<LikeOutcome, StoreError>;

    async fn like_summary(
        &self,
        recipe_id: i32,
        viewer: Option<i32>,
    ) -> Result<LikeSummary, StoreError>;
}
