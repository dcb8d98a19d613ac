use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{
    AuthResponse, Comment, CommentResponse, Credentials, Envelope, ErrorEnvelope, FeedEntry,
    Like, LikeSummary, NewRecipe, PingStatus, RecipeDetail,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error envelope.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Rejected locally before anything was sent.
    #[error("{0}")]
    Invalid(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: HTTP {0}")]
    Unexpected(StatusCode),

    #[error("unreadable response (HTTP {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The text to show the user, if the failure carries one worth showing.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } | ClientError::Invalid(message) => Some(message),
            ClientError::Http(_) | ClientError::Unexpected(_) | ClientError::Decode { .. } => None,
        }
    }
}

/// Turns a raw response into a success envelope or a classified error.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<Envelope<T>, ClientError> {
    if status.is_success() {
        return serde_json::from_slice(body).map_err(|source| ClientError::Decode { status, source });
    }

    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(err) if !err.message.is_empty() => Err(ClientError::Api {
            status,
            message: err.message,
        }),
        Ok(_) => Err(ClientError::Unexpected(status)),
        Err(source) => Err(ClientError::Decode { status, source }),
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(server: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("foodiegram-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: server.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let response = self.authed(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "response received");
        decode(status, &body)
    }

    pub async fn ping(&self) -> Result<Envelope<PingStatus>, ClientError> {
        self.send(self.http.get(self.url("/api/test/unauthed-ping")))
            .await
    }

    pub async fn signup(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Envelope<AuthResponse>, ClientError> {
        let request = self
            .http
            .post(self.url("/api/auth/signup"))
            .json(&Credentials { username, password });
        self.send(request).await
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Envelope<AuthResponse>, ClientError> {
        let request = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&Credentials { username, password });
        self.send(request).await
    }

    pub async fn feed(
        &self,
        user_id: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Envelope<Vec<FeedEntry>>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(user_id) = user_id {
            query.push(("userId", user_id.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        self.send(self.http.get(self.url("/api/recipes")).query(&query))
            .await
    }

    pub async fn recipe(&self, recipe_id: &str) -> Result<Envelope<RecipeDetail>, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/recipes/{recipe_id}"))))
            .await
    }

    pub async fn create_recipe(
        &self,
        recipe: &NewRecipe,
    ) -> Result<Envelope<RecipeDetail>, ClientError> {
        self.send(self.http.post(self.url("/api/recipes")).json(recipe))
            .await
    }

    pub async fn comments(&self, recipe_id: &str) -> Result<Envelope<Vec<Comment>>, ClientError> {
        self.send(
            self.http
                .get(self.url(&format!("/api/recipes/{recipe_id}/comment"))),
        )
        .await
    }

    pub async fn add_comment(
        &self,
        recipe_id: &str,
        content: &str,
    ) -> Result<Envelope<CommentResponse>, ClientError> {
        let request = self
            .http
            .post(self.url(&format!("/api/recipes/{recipe_id}/comment")))
            .json(&serde_json::json!({ "content": content }));
        self.send(request).await
    }

    pub async fn like(&self, recipe_id: &str) -> Result<Envelope<Like>, ClientError> {
        self.send(
            self.http
                .post(self.url(&format!("/api/recipes/{recipe_id}/like"))),
        )
        .await
    }

    pub async fn likes(&self, recipe_id: &str) -> Result<Envelope<LikeSummary>, ClientError> {
        self.send(
            self.http
                .get(self.url(&format!("/api/recipes/{recipe_id}/likes"))),
        )
        .await
    }
}
