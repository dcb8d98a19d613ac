use crate::models::Author;
use crate::store::{Store, StoreError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use super::crypto::{generate_token, hash_token};

/// Who is making the request, as far as the API is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
}

impl From<Author> for Identity {
    fn from(author: Author) -> Self {
        Self {
            user_id: author.id,
            username: author.username,
        }
    }
}

/// Resolves a bearer token to an [`Identity`].
///
/// This is the only way handlers learn who the caller is; it is injected
/// through [`crate::AppState`] and consumed by the auth extractors.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, StoreError>;
}

/// Identity backed by the `sessions` table. Tokens are only ever stored hashed.
pub struct SessionIdentity {
    store: Arc<dyn Store>,
    ttl: Duration,
}

impl SessionIdentity {
    pub fn new(store: Arc<dyn Store>, ttl_days: i64) -> Self {
        Self {
            store,
            ttl: Duration::days(ttl_days),
        }
    }

    /// Creates a session for `user_id` and returns the raw token to hand to the client.
    /// The user's expired sessions are dropped first.
    pub async fn issue(&self, user_id: i32) -> Result<String, StoreError> {
        let now = Utc::now();
        let pruned = self.store.delete_expired_sessions(user_id, now).await?;
        if pruned > 0 {
            tracing::debug!(user_id, pruned, "expired sessions removed");
        }

        let token = generate_token();
        let expires_at = now + self.ttl;
        self.store
            .create_session(user_id, &hash_token(&token), expires_at)
            .await?;
        Ok(token)
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, StoreError> {
        let author = self
            .store
            .find_session_user(&hash_token(token), Utc::now())
            .await?;
        Ok(author.map(Identity::from))
    }
}
