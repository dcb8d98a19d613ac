mod api;
mod auth;
mod config;
mod db;
mod models;
mod schema;
mod store;
mod telemetry;
#[cfg(test)]
mod test_support;

use auth::{IdentityProvider, SessionIdentity};
use axum::extract::FromRef;
use axum::Router;
use config::Config;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use store::{PgStore, Store};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Resolves bearer tokens for the auth extractors
    pub identity: Arc<dyn IdentityProvider>,
    /// Issues tokens on signup and login
    pub sessions: Arc<SessionIdentity>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        let sessions = Arc::new(SessionIdentity::new(store.clone(), config.session_ttl_days));
        Self {
            store,
            identity: sessions.clone(),
            sessions,
        }
    }

    /// Swaps in a different way of recognising callers, keeping session issuance.
    #[cfg(test)]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }
}

impl FromRef<AppState> for Arc<dyn IdentityProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}

/// The full HTTP surface: API routes, docs, and request tracing.
pub fn app(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    api::router(state)
        .merge(swagger_ui)
        .layer(telemetry::http_trace_layer())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        return match api::openapi().to_pretty_json() {
            Ok(spec) => {
                println!("{}", spec);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to render OpenAPI spec: {e}");
                ExitCode::FAILURE
            }
        };
    }

    telemetry::init_telemetry();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let pool = db::create_pool(&config.database_url, config.db_pool_size)?;
    let state = AppState::new(Arc::new(PgStore::new(pool)), &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
