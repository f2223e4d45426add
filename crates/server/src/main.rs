use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::ArticleId,
    error::{ApiError, ErrorCode},
    protocol::{
        Article, ArticleListQuery, ArticleListResponse, CategoryInfo, Comment,
        CreateCommentRequest, LoginRequest, LoginResponse,
    },
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod auth;
mod config;

use api::ApiContext;
use app_state::AppState;
use auth::{bearer_token, verify_token, AuthConfig};
use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        auth: AuthConfig {
            secret: settings.jwt_secret,
            ttl_seconds: settings.token_ttl_seconds,
        },
        page_size: settings.page_size,
    };

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/categories", get(http_list_categories))
        .route("/api/tags/popular", get(http_popular_tags))
        .route("/api/articles", get(http_list_articles))
        .route("/api/articles/:article_id", get(http_get_article))
        .route("/api/articles/:article_id/comments", post(http_add_comment))
        .route("/api/auth/login", post(http_login))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        Some(ErrorCode::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorCode::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::Unauthorized) => StatusCode::UNAUTHORIZED,
        Some(ErrorCode::Internal) | None => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

fn bad_query(rejection: QueryRejection) -> (StatusCode, Json<ApiError>) {
    warn!(error = %rejection, "rejected query string");
    error_response(ApiError::validation(rejection.body_text()))
}

fn bad_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    warn!(error = %rejection, "rejected request body");
    error_response(ApiError::validation(rejection.body_text()))
}

/// Unparseable ids answer like a missing article.
fn article_path(path: Result<Path<i64>, PathRejection>) -> ApiResult<ArticleId> {
    let Path(article_id) = path.map_err(|rejection| {
        warn!(error = %rejection, "rejected article path");
        error_response(ApiError::not_found("Article not found"))
    })?;
    Ok(ArticleId(article_id))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|error| {
            warn!(%error, "health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        })?;
    Ok("ok")
}

async fn http_list_categories() -> Json<Vec<CategoryInfo>> {
    Json(api::list_categories())
}

async fn http_popular_tags(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let tags = api::popular_tags(&state.api).await.map_err(error_response)?;
    Ok(Json(tags))
}

async fn http_list_articles(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ArticleListQuery>, QueryRejection>,
) -> ApiResult<Json<ArticleListResponse>> {
    let Query(q) = query.map_err(bad_query)?;
    let response = api::list_articles(&state.api, q)
        .await
        .map_err(error_response)?;
    Ok(Json(response))
}

async fn http_get_article(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Article>> {
    let article_id = article_path(path)?;
    let article = api::get_article(&state.api, article_id)
        .await
        .map_err(error_response)?;
    Ok(Json(article))
}

async fn http_add_comment(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    headers: HeaderMap,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let article_id = article_path(path)?;
    let user_id = bearer_token(&headers)
        .and_then(|token| verify_token(&state.api.auth, token))
        .map_err(|e| {
            warn!(error = %e, "rejected comment submission");
            error_response(ApiError::unauthorized("Authorization required"))
        })?;
    let Json(req) = body.map_err(bad_body)?;

    let comment = api::add_comment(&state.api, user_id, article_id, &req.content)
        .await
        .map_err(error_response)?;
    info!(%article_id, %user_id, comment_id = %comment.id, "comment added");
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn http_login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = body.map_err(bad_body)?;
    let response = api::login(&state.api, &req.username)
        .await
        .map_err(error_response)?;
    Ok(Json(response))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
