//! HTTP routes for the scoreboard.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, instrument, warn};

use crate::{ConfigError, ScoreService, ScoreUpdate, ServiceError, User};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    service: ScoreService,
}

impl AppState {
    /// Wraps a service for injection into handlers.
    pub fn new(service: ScoreService) -> Self {
        Self { service }
    }

    /// Runs a service call on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&ScoreService) -> Result<T, ServiceError> + Send + 'static,
    {
        let service = self.service.clone();
        let result = tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| ApiError::Task(e.to_string()))?;
        Ok(result?)
    }
}

/// Error returned from a handler.
#[derive(Debug, Display, Error, From)]
pub enum ApiError {
    /// The service rejected or failed the request.
    #[display("{}", _0)]
    #[from]
    Service(ServiceError),
    /// The blocking task panicked or was cancelled.
    #[display("Task failed: {}", _0)]
    Task(#[error(not(source))] String),
    /// The request path, query or body could not be extracted.
    #[display("{}", message)]
    Rejected {
        /// Status chosen by the extractor.
        status: StatusCode,
        /// Extractor's description of the problem.
        message: String,
    },
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Service(ServiceError::InvalidRequest(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Service(ServiceError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Service(ServiceError::Database(e)) => {
                error!(error = %e, "Database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            ApiError::Task(msg) => {
                error!(error = %msg, "Handler task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            ApiError::Rejected { status, message } => {
                debug!(%status, error = %message, "Request rejected by extractor");
                (status, message)
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Query parameters for the user listing.
#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    skip: i64,
    limit: Option<i64>,
}

/// Builds the API router with all routes bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/users/register", post(register_users))
        .route("/users/update_scors", post(update_user_score))
        .route("/users", get(read_users))
        .route("/users/", get(read_users))
        .route("/users/top10", get(read_users_top10))
        .route("/users/get_by_id/{user_id}", get(read_user_by_id))
        .route("/users/get_by_name/{user_name}", get(read_user_by_name))
        .with_state(state)
}

/// Builds the router wrapped in request tracing and CORS layers.
///
/// # Errors
///
/// Returns [`ConfigError`] if an origin is not a valid header value.
pub fn app(state: AppState, cors_origins: &[String]) -> Result<Router, ConfigError> {
    Ok(router(state)
        .layer(cors_layer(cors_origins)?)
        .layer(TraceLayer::new_for_http()))
}

/// CORS policy allowing the given origins with any method and header.
#[instrument]
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| ConfigError::new(format!("Invalid CORS origin '{}': {}", origin, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = origins.len(), "CORS origins configured");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn read_root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

#[instrument(skip_all)]
async fn register_users(
    State(state): State<AppState>,
    body: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let Json(names) = body?;
    debug!(count = names.len(), "Register request");
    let users = state.run(move |service| service.register_users(names)).await?;
    Ok(Json(users))
}

#[instrument(skip_all)]
async fn update_user_score(
    State(state): State<AppState>,
    body: Result<Json<Vec<ScoreUpdate>>, JsonRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let Json(items) = body?;
    debug!(count = items.len(), "Score update request");
    let users = state
        .run(move |service| service.update_scores(items))
        .await
        .inspect_err(|e| warn!(error = %e, "Score batch rejected"))?;
    Ok(Json(users))
}

#[instrument(skip_all)]
async fn read_users(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let Query(params) = query?;
    let users = state
        .run(move |service| service.list_users(params.skip, params.limit))
        .await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
async fn read_users_top10(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.run(|service| service.top10()).await?;
    Ok(Json(users))
}

#[instrument(skip_all)]
async fn read_user_by_id(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(user_id) = path?;
    let user = state
        .run(move |service| service.get_user_by_id(user_id))
        .await?;
    Ok(Json(user))
}

#[instrument(skip_all)]
async fn read_user_by_name(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(user_name) = path?;
    let user = state
        .run(move |service| service.get_user_by_name(&user_name))
        .await?;
    Ok(Json(user))
}
