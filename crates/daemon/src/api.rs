use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use control_plane_core::{
    api::{JobAccepted, JobCreateRequest, JobView, SessionCreateRequest, SessionCreated, SessionView},
    Clock,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, config::DaemonConfig, error::ApiError, service::ControlPlane};

#[derive(Clone)]
pub struct AppState {
    pub cp: Arc<ControlPlane>,
    pub config: Arc<DaemonConfig>,
}

impl AppState {
    pub fn new(config: DaemonConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cp: Arc::new(ControlPlane::new(clock)),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/{id}", get(get_job))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    let mut app = Router::new()
        .route("/healthz", get(healthz))
        .merge(gated)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http());
    if state.config.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }
    app.with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_job(
    State(state): State<AppState>,
    payload: Result<Json<JobCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
    let Json(req) = payload?;
    let accepted = state.cp.admit_job(&req)?;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobView>, ApiError> {
    Ok(Json(state.cp.job(&id)?))
}

async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let Json(req) = payload?;
    let created = state.cp.admit_session(&req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.cp.session(&id)?))
}
