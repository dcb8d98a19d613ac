use crate::api::ApiError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;

use super::identity::{Identity, IdentityProvider};

/// Extractor that requires a valid bearer token and provides the caller's identity.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(AuthUser(identity): AuthUser) -> impl IntoResponse {
///     // identity.user_id is the acting user
/// }
/// ```
pub struct AuthUser(pub Identity);

/// Like [`AuthUser`], but anonymous callers get `None` instead of a 401.
pub struct MaybeAuthUser(pub Option<Identity>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn resolve<S>(parts: &Parts, state: &S) -> Result<Option<Identity>, ApiError>
where
    Arc<dyn IdentityProvider>: FromRef<S>,
{
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };

    let identity = Arc::<dyn IdentityProvider>::from_ref(state);
    Ok(identity.resolve(token).await?)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<dyn IdentityProvider>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<dyn IdentityProvider>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve(parts, state).await?))
    }
}
