pub mod error;
pub mod public;
pub mod recipes;

pub use error::ApiError;

use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::models::Ingredient;
use crate::store::Page;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Uniform success wrapper: `{success, message, data}` plus paging info on list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    /// Total number of items available
    pub total: i64,
    /// Number of items requested (limit)
    pub limit: i64,
    /// Number of items skipped (offset)
    pub offset: i64,
}

impl Pagination {
    pub fn new(page: Page, total: i64) -> Self {
        Self {
            total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// Number of items to return
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
}

impl PageParams {
    /// Applies the default limit and clamps both values into range.
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> Page {
        Page {
            limit: self.limit.unwrap_or(default_limit).clamp(1, max_limit),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }

    pub fn from_query(
        query: Result<Query<PageParams>, QueryRejection>,
    ) -> Result<PageParams, ApiError> {
        query
            .map(|Query(params)| params)
            .map_err(|_| ApiError::bad_request("Invalid pagination parameters"))
    }
}

/// Unwraps a JSON body, turning any rejection (bad syntax, wrong types,
/// missing content type) into a 400 envelope.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|_| ApiError::bad_request("Invalid request body"))
}

/// Parses a numeric path segment. Unlike a typed `Path<i32>`, this lets a bad
/// id produce the normal error envelope.
pub fn parse_id(raw: &str, message: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::bad_request(message))
}

pub fn parse_recipe_id(raw: &str) -> Result<i32, ApiError> {
    parse_id(raw, "Invalid recipe ID")
}

/// All API routes, with state applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .nest("/api/recipes", recipes::router())
        .route(
            "/api/users/{user_id}/recipes",
            get(recipes::list::list_user_recipes),
        )
        .with_state(state)
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(
        info(title = "FoodieGram API"),
        components(schemas(ErrorResponse, Pagination, Ingredient))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> =
        vec![public::ApiDoc::openapi(), recipes::ApiDoc::openapi()];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
