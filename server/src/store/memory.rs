//! In-process [`Store`] used by handler tests.
//!
//! Mirrors the PostgreSQL constraints that matter to the API: unique
//! usernames (case-insensitive), foreign keys from comments/likes to recipes,
//! and one like per (user, recipe).

use super::{LikeOutcome, LikeSummary, Page, Paged, RecipeDraft, Store, StoreError};
use crate::models::{Author, Comment, Like, Recipe, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct SessionRow {
    user_id: i32,
    token_hash: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<SessionRow>,
    recipes: Vec<Recipe>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

impl Tables {
    fn author(&self, user_id: i32) -> Result<Author, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| Author {
                id: u.id,
                username: u.username.clone(),
            })
            .ok_or(StoreError::NotFound)
    }

    fn has_recipe(&self, recipe_id: i32) -> bool {
        self.recipes.iter().any(|r| r.id == recipe_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Pool("memory store poisoned".to_string()))
    }

    pub fn comment_count(&self) -> usize {
        self.tables().map(|t| t.comments.len()).unwrap_or(0)
    }

    pub fn like_count(&self) -> usize {
        self.tables().map(|t| t.likes.len()).unwrap_or(0)
    }

    pub fn recipe_count(&self) -> usize {
        self.tables().map(|t| t.recipes.len()).unwrap_or(0)
    }

    pub fn session_count(&self) -> usize {
        self.tables().map(|t| t.sessions.len()).unwrap_or(0)
    }
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX - 1) + 1
}

fn window<T: Clone>(rows: &[T], page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    rows.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            id: next_id(tables.users.len()),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.deleted_at.is_none() && u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create_session(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        tables.sessions.push(SessionRow {
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn delete_expired_sessions(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|s| s.user_id != user_id || s.expires_at > now);
        Ok(before - tables.sessions.len())
    }

    async fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Author>, StoreError> {
        let tables = self.tables()?;
        let Some(session) = tables
            .sessions
            .iter()
            .find(|s| s.token_hash == token_hash && s.expires_at > now)
        else {
            return Ok(None);
        };

        Ok(tables
            .users
            .iter()
            .find(|u| u.id == session.user_id && u.deleted_at.is_none())
            .map(|u| Author {
                id: u.id,
                username: u.username.clone(),
            }))
    }

    async fn create_recipe(&self, user_id: i32, draft: &RecipeDraft) -> Result<Recipe, StoreError> {
        let ingredients = serde_json::to_value(&draft.ingredients)?;
        let mut tables = self.tables()?;
        tables.author(user_id)?;

        let now = Utc::now();
        let recipe = Recipe {
            id: next_id(tables.recipes.len()),
            user_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            ingredients,
            instructions: draft.instructions.clone(),
            image_urls: draft.image_urls.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn get_recipe(&self, recipe_id: i32) -> Result<Option<(Recipe, Author)>, StoreError> {
        let tables = self.tables()?;
        match tables.recipes.iter().find(|r| r.id == recipe_id) {
            Some(recipe) => Ok(Some((recipe.clone(), tables.author(recipe.user_id)?))),
            None => Ok(None),
        }
    }

    async fn recipe_exists(&self, recipe_id: i32) -> Result<bool, StoreError> {
        Ok(self.tables()?.has_recipe(recipe_id))
    }

    async fn list_recipes(
        &self,
        owner: Option<i32>,
        page: Page,
    ) -> Result<Paged<(Recipe, Author)>, StoreError> {
        let tables = self.tables()?;
        let mut matching: Vec<&Recipe> = tables
            .recipes
            .iter()
            .filter(|r| owner.is_none_or(|o| r.user_id == o))
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = matching.len() as i64;
        let mut items = Vec::new();
        for recipe in window(&matching, page) {
            items.push((recipe.clone(), tables.author(recipe.user_id)?));
        }

        Ok(Paged { items, total })
    }

    async fn create_comment(
        &self,
        user_id: i32,
        recipe_id: i32,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.tables()?;
        if !tables.has_recipe(recipe_id) {
            return Err(StoreError::RecipeNotFound);
        }

        let now = Utc::now();
        let comment = Comment {
            id: next_id(tables.comments.len()),
            content: content.to_string(),
            user_id,
            recipe_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(
        &self,
        recipe_id: i32,
        page: Page,
    ) -> Result<Paged<(Comment, Author)>, StoreError> {
        let tables = self.tables()?;
        let matching: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| c.recipe_id == recipe_id)
            .collect();

        let total = matching.len() as i64;
        let mut items = Vec::new();
        for comment in window(&matching, page) {
            items.push((comment.clone(), tables.author(comment.user_id)?));
        }

        Ok(Paged { items, total })
    }

    async fn add_like(&self, user_id: i32, recipe_id: i32) -> Result<LikeOutcome, StoreError> {
        let mut tables = self.tables()?;
        if !tables.has_recipe(recipe_id) {
            return Err(StoreError::RecipeNotFound);
        }

        if let Some(existing) = tables
            .likes
            .iter()
            .find(|l| l.user_id == user_id && l.recipe_id == recipe_id)
        {
            return Ok(LikeOutcome::AlreadyLiked(existing.clone()));
        }

        let like = Like {
            id: next_id(tables.likes.len()),
            user_id,
            recipe_id,
            created_at: Utc::now(),
        };
        tables.likes.push(like.clone());
        Ok(LikeOutcome::Created(like))
    }

    async fn like_summary(
        &self,
        recipe_id: i32,
        viewer: Option<i32>,
    ) -> Result<LikeSummary, StoreError> {
        let tables = self.tables()?;
        let for_recipe = || tables.likes.iter().filter(|l| l.recipe_id == recipe_id);

        Ok(LikeSummary {
            likes: for_recipe().count() as i64,
            has_liked: viewer.is_some_and(|v| for_recipe().any(|l| l.user_id == v)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn draft(title: &str) -> RecipeDraft {
        RecipeDraft {
            title: title.to_string(),
            description: "desc".to_string(),
            ingredients: vec![Ingredient {
                name: "flour".to_string(),
                quantity: "1 cup".to_string(),
            }],
            instructions: vec!["mix".to_string()],
            image_urls: vec![],
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        store.create_user("Alice", "hash").await.unwrap();
        let dup = store.create_user("alice", "hash").await;
        assert!(matches!(dup, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_comment_on_missing_recipe_is_rejected() {
        let store = MemoryStore::new();
        let user = store.create_user("bob", "hash").await.unwrap();
        let result = store.create_comment(user.id, 99, "hi").await;
        assert!(matches!(result, Err(StoreError::RecipeNotFound)));
        assert_eq!(store.comment_count(), 0);
    }

    #[tokio::test]
    async fn test_like_is_unique_per_user_and_recipe() {
        let store = MemoryStore::new();
        let user = store.create_user("carol", "hash").await.unwrap();
        let recipe = store.create_recipe(user.id, &draft("Soup")).await.unwrap();

        let first = store.add_like(user.id, recipe.id).await.unwrap();
        let second = store.add_like(user.id, recipe.id).await.unwrap();

        let (LikeOutcome::Created(a), LikeOutcome::AlreadyLiked(b)) = (first, second) else {
            panic!("expected created then already-liked");
        };
        assert_eq!(a.id, b.id);
        assert_eq!(store.like_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let store = MemoryStore::new();
        let user = store.create_user("dave", "hash").await.unwrap();
        let now = Utc::now();
        store
            .create_session(user.id, "h", now - chrono::Duration::minutes(1))
            .await
            .unwrap();

        assert!(store.find_session_user("h", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions_only_touches_that_user() {
        let store = MemoryStore::new();
        let gail = store.create_user("gail", "hash").await.unwrap();
        let hugo = store.create_user("hugo", "hash").await.unwrap();
        let now = Utc::now();
        let past = now - chrono::Duration::days(1);
        let future = now + chrono::Duration::days(1);

        store.create_session(gail.id, "g-old", past).await.unwrap();
        store.create_session(gail.id, "g-live", future).await.unwrap();
        store.create_session(hugo.id, "h-old", past).await.unwrap();

        assert_eq!(store.delete_expired_sessions(gail.id, now).await.unwrap(), 1);
        assert_eq!(store.session_count(), 2);
        assert!(store.find_session_user("g-live", now).await.unwrap().is_some());
    }
}
