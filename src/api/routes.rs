use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::domain::{AlertRule, AlertRuleForm, RuleId};
use crate::error::RegistryError;
use crate::observability::MetricsRegistry;
use crate::registry::RegistryController;

use super::request::{parse_json, parse_rule_id};
use super::response::{CommonResponse, HealthResponse, ReadyResponse};

/// Shared application state.
pub struct AppState {
    /// Rule workflows and the registry they maintain
    pub controller: RegistryController,

    /// Counters rendered at /metrics
    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

impl AppState {
    pub fn new(controller: RegistryController, metrics: Arc<MetricsRegistry>) -> Self {
        AppState {
            controller,
            metrics,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

type ApiResult<T> = Result<Json<CommonResponse<T>>, RegistryError>;

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/v1/alert-rule",
            get(list_alert_rules).post(create_alert_rule),
        )
        .route("/api/v1/alert-rule/:id", patch(update_alert_rule))
        .route(
            "/api/v1/batch-delete/alert-rule",
            post(batch_delete_alert_rules),
        )
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// List every alert rule.
async fn list_alert_rules(State(state): State<Arc<AppState>>) -> Json<CommonResponse<Vec<AlertRule>>> {
    Json(CommonResponse::ok(state.controller.list()))
}

/// Create an alert rule, returning its id.
async fn create_alert_rule(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<RuleId> {
    let form: AlertRuleForm = parse_json(&body)?;
    let id = state.controller.create(form).await?;
    Ok(Json(CommonResponse::ok(id)))
}

/// Overwrite an existing alert rule.
async fn update_alert_rule(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<RuleId> {
    let id = parse_rule_id(&raw_id)?;
    let form: AlertRuleForm = parse_json(&body)?;
    let id = state.controller.update(id, form).await?;
    Ok(Json(CommonResponse::ok(id)))
}

/// Delete every rule in the id list.
async fn batch_delete_alert_rules(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<()> {
    let ids: Vec<RuleId> = parse_json(&body)?;
    state.controller.batch_delete(ids).await?;
    Ok(Json(CommonResponse::empty()))
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.controller.registry();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        rules: registry.len(),
        generation: registry.generation(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
///
/// Ready once the registry has been rebuilt from the store. An empty rule
/// set is a valid ready state.
async fn handle_ready(State(state): State<Arc<AppState>>) -> Response {
    let registry = state.controller.registry();

    if !registry.is_loaded() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(CommonResponse::<()>::failure(
                "Alert rules not loaded",
                "NOT_READY",
            )),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            rules: registry.len(),
            generation: registry.generation(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.controller.registry();
    let metrics = state.metrics.to_prometheus(
        registry.len(),
        registry.generation(),
        state.start_time.elapsed().as_secs(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}
