pub mod config;
pub mod handlers;
pub mod logging;


use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use finsight_aggregation::YodleeClient;
use finsight_core::sample::sample_goals;
use finsight_core::{Goal, UuidIdGenerator};
use finsight_import::CategoryRuleEngine;
use finsight_storage::{DbPool, StoreError, TransactionStore};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;

/// CSV uploads larger than this are rejected.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub engine: Arc<CategoryRuleEngine>,
    pub store: Mutex<TransactionStore>,
    pub ids: UuidIdGenerator,
    pub yodlee: Option<YodleeClient>,
    pub goals: Vec<Goal>,
    /// Pins "today" for budget periods and goal maths.
    pub fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub async fn build(config: &ServerConfig, pool: DbPool) -> anyhow::Result<Self> {
        let engine = load_engine(config.rules.as_deref())?;
        let store = TransactionStore::load(pool, config.seed_sample).await?;
        let yodlee = config.yodlee.clone().map(YodleeClient::new);
        if yodlee.is_none() {
            info!("No Yodlee configuration, aggregation sync disabled");
        }
        let goals = if config.seed_sample {
            sample_goals()
        } else {
            Vec::new()
        };

        Ok(Self {
            engine: Arc::new(engine),
            store: Mutex::new(store),
            ids: UuidIdGenerator::default(),
            yodlee,
            goals,
            fixed_today: None,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Built-in rule table unless a TOML file is given.
pub fn load_engine(path: Option<&Path>) -> anyhow::Result<CategoryRuleEngine> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read rules from {}: {}", path.display(), e))?;
            let engine = CategoryRuleEngine::from_toml(&content)?;
            info!(rules = engine.len(), path = %path.display(), "Loaded rule table");
            Ok(engine)
        }
        None => Ok(CategoryRuleEngine::default()),
    }
}

/// Error type for API responses
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            internal: None,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(message: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.to_string(),
            internal: None,
        }
    }

    /// An upstream service failed; the cause is logged, not returned.
    pub fn bad_gateway(message: &str, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.to_string(),
            internal: Some(err.into()),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }

    /// Store lookups that miss become 404s, everything else is internal.
    pub fn store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::not_found(&format!("Transaction {} not found", id)),
            other => Self::internal(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(ref err) = self.internal {
            error!(status = %self.status, error = %err, "Request failed");
        }

        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::internal(err)
    }
}

/// Build the router with all API routes
pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/classify", post(handlers::classify))
        .route("/classify/batch", post(handlers::classify_batch))
        .route(
            "/transactions",
            get(handlers::list_transactions).delete(handlers::clear_all_transactions),
        )
        .route("/transactions/imported", delete(handlers::clear_imported_transactions))
        .route("/transactions/recategorize", post(handlers::recategorize_all))
        .route("/transactions/{id}", patch(handlers::update_transaction))
        .route("/transactions/{id}/recategorize", post(handlers::recategorize_transaction))
        .route("/import/csv", post(handlers::import_csv))
        .route("/accounts", get(handlers::list_accounts))
        .route("/net-worth", get(handlers::net_worth))
        .route("/asset-allocation", get(handlers::get_asset_allocation))
        .route("/categories", get(handlers::list_categories))
        .route("/budget", get(handlers::budget))
        .route("/goals", get(handlers::list_goals))
        .route("/aggregation/sync", post(handlers::aggregation_sync));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
}

/// Any origin when none are configured.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
