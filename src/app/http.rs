// ==========================================
// 教会社区管理 - HTTP 层
// ==========================================
// 职责: 路由注册、调用方身份中间件、请求超时、错误 → HTTP 状态码
// 约束: 仓储调用为同步阻塞，统一放入 spawn_blocking
// ==========================================

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::api::{ApiError, ApiResult};
use crate::app::state::AppState;
use crate::engine::permission::Caller;
use crate::i18n::t;

/// 上游认证层注入的人员ID请求头
pub const CALLER_HEADER: &str = "x-user-id";

// ==========================================
// 错误 → HTTP 响应
// ==========================================

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            ApiError::SegmentMismatch(_) => StatusCode::FORBIDDEN,
            ApiError::OutOfSegmentGroups { .. } => StatusCode::BAD_REQUEST,
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RepositoryError(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            ApiError::OutOfSegmentGroups { invalid_ids, .. } => json!({ "invalidIds": invalid_ids }),
            _ => serde_json::Value::Null,
        };
        let body = json!({
            "ok": false,
            "code": self.code(),
            "message": self.to_string(),
            "details": details,
        });
        (status, Json(body)).into_response()
    }
}

// ==========================================
// 路由
// ==========================================

/// 构建完整路由
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/segmentos/:segment_id/directores",
            get(list_directors).post(create_director),
        )
        .route(
            "/api/segmentos/:segment_id/directores/:director_id",
            delete(delete_director),
        )
        .route(
            "/api/segmentos/:segment_id/directores/:director_id/grupos",
            get(list_groups).post(sync_groups),
        )
        .route(
            "/api/segmentos/:segment_id/directores/:director_id/historial",
            get(list_history),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            caller_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            timeout_middleware,
        ))
        .with_state(state)
}

// ==========================================
// 中间件
// ==========================================

/// 解析调用方身份并存入请求扩展
async fn caller_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let person_id = request
        .headers()
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(ApiError::authentication_required)?;

    let caller = run_blocking({
        let state = state.clone();
        move || state.resolve_caller(&person_id)
    })
    .await?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// 超时后返回 504；调用方应重新读取当前状态后幂等重试
async fn timeout_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(state.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout = ?state.request_timeout, "请求超时");
            ApiError::timeout().into_response()
        }
    }
}

async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(&e.to_string()))?
}

// ==========================================
// 处理器
// ==========================================

async fn health() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "version": crate::VERSION,
    }))
}

async fn list_directors(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(segment_id): Path<String>,
) -> Result<Response, ApiError> {
    let api = state.director_api.clone();
    let directores = run_blocking(move || api.list_directors(&caller, &segment_id)).await?;
    Ok(Json(json!({ "ok": true, "directores": directores })).into_response())
}

async fn create_director(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(segment_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let api = state.director_api.clone();
    let director =
        run_blocking(move || api.create_director_json(&caller, &segment_id, &body)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "director": director })),
    )
        .into_response())
}

async fn delete_director(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((segment_id, director_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let api = state.director_api.clone();
    let removal =
        run_blocking(move || api.delete_director(&caller, &segment_id, &director_id)).await?;
    Ok(Json(json!({
        "ok": true,
        "message": t("common.success"),
        "locationsRemoved": removal.locations_removed,
        "assignmentsRemoved": removal.assignments_removed,
    }))
    .into_response())
}

async fn list_groups(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((segment_id, director_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let api = state.assignment_api.clone();
    let listing = run_blocking(move || {
        api.list_assignable_groups(&caller, &segment_id, &director_id)
    })
    .await?;
    Ok(Json(listing).into_response())
}

async fn sync_groups(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((segment_id, director_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let api = state.assignment_api.clone();
    let outcome = run_blocking(move || {
        api.synchronize_json(&caller, &segment_id, &director_id, &body)
    })
    .await?;
    Ok(Json(outcome.to_response()).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((segment_id, director_id)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let api = state.director_api.clone();
    let historial = run_blocking(move || {
        api.list_history(&caller, &segment_id, &director_id, query.limit)
    })
    .await?;
    Ok(Json(json!({ "ok": true, "historial": historial })).into_response())
}
