//! Axum REST API handlers.
//!
//! | Route                      | Body                                   |
//! |----------------------------|----------------------------------------|
//! | `GET /health`              | [`HealthResponse`]                     |
//! | `GET /events`              | every indexed event                    |
//! | `GET /projects`            | every project snapshot                 |
//! | `GET /projects/:id`        | one project snapshot, `404` if unknown |
//! | `GET /projects/:id/events` | events for one project                 |
//! | `GET /pool`                | aggregate balance and reserve          |

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::{IndexerError, Result};
use crate::events::{EventRecord, PoolRecord, ProjectRecord};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/projects", get(get_projects))
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/events", get(get_project_events))
        .route("/pool", get(get_pool))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub project_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub project_id: String,
    pub target: String,
    pub contributions: String,
    pub allocated: String,
    pub outstanding: String,
    pub registered_ledger: i64,
}

impl TryFrom<ProjectRecord> for ProjectResponse {
    type Error = IndexerError;

    fn try_from(record: ProjectRecord) -> Result<Self> {
        let outstanding = record.outstanding()?.to_string();
        Ok(ProjectResponse {
            project_id: record.project_id,
            target: record.target,
            contributions: record.contributions,
            allocated: record.allocated,
            outstanding,
            registered_ledger: record.registered_ledger,
        })
    }
}

#[derive(Serialize)]
pub struct ProjectsResponse {
    pub count: usize,
    pub projects: Vec<ProjectResponse>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        let status = match self {
            IndexerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /projects/:id/events`
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Json<EventsResponse>> {
    let events = db::get_events_for_project(&state.pool, &project_id).await?;
    Ok(Json(EventsResponse {
        project_id,
        count: events.len(),
        events,
    }))
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /projects`
pub async fn get_projects(State(state): State<Arc<ApiState>>) -> Result<Json<ProjectsResponse>> {
    let projects = db::get_projects(&state.pool)
        .await?
        .into_iter()
        .map(ProjectResponse::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(ProjectsResponse {
        count: projects.len(),
        projects,
    }))
}

/// `GET /projects/:id`
pub async fn get_project(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>> {
    let record = db::get_project(&state.pool, &project_id).await?;
    Ok(Json(ProjectResponse::try_from(record)?))
}

/// `GET /pool`
pub async fn get_pool(State(state): State<Arc<ApiState>>) -> Result<Json<PoolRecord>> {
    Ok(Json(db::get_pool(&state.pool).await?))
}
