//! Router-level test harness: the real routes over an in-memory store.

use crate::config::Config;
use crate::models::{Author, Comment, Ingredient, Recipe, User};
use crate::store::{
    LikeOutcome, LikeSummary, MemoryStore, Page, Paged, RecipeDraft, Store, StoreError,
};
use crate::AppState;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store.clone(), store)
    }

    /// Users and sessions work; every recipe, comment and like query fails.
    pub fn failing() -> Self {
        let store = Arc::new(MemoryStore::new());
        let broken = Arc::new(BrokenContent {
            inner: store.clone(),
        });
        Self::build(store, broken)
    }

    fn build(store: Arc<MemoryStore>, backend: Arc<dyn Store>) -> Self {
        let state = AppState::new(backend, &Config::default());
        Self::from_state(store, state)
    }

    pub fn from_state(store: Arc<MemoryStore>, state: AppState) -> Self {
        Self {
            router: crate::app(state.clone()),
            store,
            state,
        }
    }

    /// Creates a user (who cannot log in by password) and returns its id and a live bearer token.
    pub async fn user(&self, username: &str) -> (i32, String) {
        let user = self
            .store
            .create_user(username, "unused-password-hash")
            .await
            .unwrap();
        let token = self.state.sessions.issue(user.id).await.unwrap();
        (user.id, token)
    }

    pub async fn recipe(&self, user_id: i32, title: &str) -> i32 {
        let draft = RecipeDraft {
            title: title.to_string(),
            description: format!("How to make {title}"),
            ingredients: vec![Ingredient {
                name: "flour".to_string(),
                quantity: "2 cups".to_string(),
            }],
            instructions: vec!["Mix".to_string(), "Cook".to_string()],
            image_urls: vec![],
        };
        self.store.create_recipe(user_id, &draft).await.unwrap().id
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call("POST", uri, token, Some(body.to_string())).await
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::from_bytes(method.as_bytes()).unwrap())
            .uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// A store whose database went away after login.
struct BrokenContent {
    inner: Arc<MemoryStore>,
}

fn outage() -> StoreError {
    StoreError::Pool("connection refused: postgres://app:secret@db:5432".to_string())
}

#[async_trait]
impl Store for BrokenContent {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        self.inner.create_user(username, password_hash).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_user_by_username(username).await
    }

    async fn create_session(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.inner
            .create_session(user_id, token_hash, expires_at)
            .await
    }

    async fn delete_expired_sessions(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        self.inner.delete_expired_sessions(user_id, now).await
    }

    async fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Author>, StoreError> {
        self.inner.find_session_user(token_hash, now).await
    }

    async fn create_recipe(&self, _: i32, _: &RecipeDraft) -> Result<Recipe, StoreError> {
        Err(outage())
    }

    async fn get_recipe(&self, _: i32) -> Result<Option<(Recipe, Author)>, StoreError> {
        Err(outage())
    }

    async fn recipe_exists(&self, _: i32) -> Result<bool, StoreError> {
        Err(outage())
    }

    async fn list_recipes(
        &self,
        _: Option<i32>,
        _: Page,
    ) -> Result<Paged<(Recipe, Author)>, StoreError> {
        Err(outage())
    }

    async fn create_comment(&self, _: i32, _: i32, _: &str) -> Result<Comment, StoreError> {
        Err(outage())
    }

    async fn list_comments(&self, _: i32, _: Page) -> Result<Paged<(Comment, Author)>, StoreError> {
        Err(outage())
    }

    async fn add_like(&self, _: i32, _: i32) -> Result<LikeOutcome, StoreError> {
        Err(outage())
    }

    async fn like_summary(&self, _: i32, _: Option<i32>) -> Result<LikeSummary, StoreError> {
        Err(outage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, IdentityProvider};
    use serde_json::json;

    /// Accepts a single fixed token, with no session table involved.
    struct FixedIdentity(Identity);

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn resolve(&self, token: &str) -> Result<Option<Identity>, StoreError> {
            Ok((token == "let-me-in").then(|| self.0.clone()))
        }
    }

    #[tokio::test]
    async fn test_injected_identity_provider_decides_who_is_calling() {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("ghost", "hash").await.unwrap();
        let state = AppState::new(store.clone(), &Config::default()).with_identity(Arc::new(
            FixedIdentity(Identity {
                user_id: user.id,
                username: user.username.clone(),
            }),
        ));
        let app = TestApp::from_state(store, state);
        let recipe_id = app.recipe(user.id, "Miso Soup").await;
        let uri = format!("/api/recipes/{recipe_id}/comment");

        let (status, _) = app
            .post(&uri, Some("let-me-in"), json!({"content": "umami"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        // A real session token means nothing to this provider
        let token = app.state.sessions.issue(user.id).await.unwrap();
        let (status, _) = app.post(&uri, Some(&token), json!({"content": "x"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, body) = app.get(&uri, None).await;
        assert_eq!(body["data"][0]["user"]["username"], "ghost");
        assert_eq!(app.store.comment_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ping() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/test/unauthed-ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "message": "pong", "data": {"status": "ok"}})
        );
    }
}
