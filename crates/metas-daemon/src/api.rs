// api.rs — JSON API handlers under /api.
//
// Storage calls are synchronous SQLite work, so every handler hops onto
// the blocking pool via `run_blocking` before touching the service.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use metas_core::{Catalog, Meta, MetaDraft, MetaError, MetaFilter, MetaService, MetaSummary};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::AppState;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Meta(#[from] MetaError),

    /// The body was not a JSON object at all.
    #[error("invalid request body: {0}")]
    Body(String),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Meta(MetaError::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::Meta(MetaError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("goal {} not found", id) })),
            )
                .into_response(),
            ApiError::Body(message) => {
                tracing::warn!("rejected request body: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "body": message }))).into_response()
            }
            other => {
                tracing::error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// Listing query string. Everything arrives as text so that an empty
/// `anio=` from an HTML form is ignored instead of rejected. A division may
/// be given by catalog slug (`el-teniente`) or by name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub division: Option<String>,
    pub proceso: Option<String>,
    pub anio: Option<String>,
}

impl FilterParams {
    pub fn to_filter(&self) -> MetaFilter {
        MetaFilter {
            division: non_blank(&self.division).map(|d| {
                Catalog::division_name(&d).map_or(d, str::to_string)
            }),
            proceso: non_blank(&self.proceso),
            anio: self.anio.as_deref().and_then(|a| a.trim().parse().ok()),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Run a service call on the blocking pool.
pub(crate) async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&MetaService) -> Result<T, MetaError> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    Ok(tokio::task::spawn_blocking(move || f(&service)).await??)
}

/// `POST /api/metas/` — validate and store a goal.
///
/// 201 with the stored goal, 400 with a field → message map, or 500 when
/// storage fails.
pub async fn create_meta(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Meta>), ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::Body(rejection.body_text()))?;
    let draft = parse_draft(body)?;
    let meta = run_blocking(&state, move |service| service.create(&draft)).await?;
    Ok((StatusCode::CREATED, Json(meta)))
}

/// Only a JSON object is a draft. Arrays would otherwise deserialize
/// positionally into the draft's fields.
fn parse_draft(body: Value) -> Result<MetaDraft, ApiError> {
    if !body.is_object() {
        return Err(ApiError::Body("expected a JSON object".to_string()));
    }
    serde_json::from_value(body).map_err(|e| ApiError::Body(e.to_string()))
}

/// `GET /api/metas/` — all goals in insertion order, optionally filtered.
pub async fn list_metas(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Meta>>, ApiError> {
    let filter = params.to_filter();
    let metas = run_blocking(&state, move |service| service.list(&filter)).await?;
    Ok(Json(metas))
}

/// `GET /api/metas/{id}`
pub async fn get_meta(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Meta>, ApiError> {
    let meta = run_blocking(&state, move |service| service.get(id)).await?;
    Ok(Json(meta))
}

/// `GET /api/metas/resumen` — counts per division, process and indicator.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<MetaSummary>, ApiError> {
    let filter = params.to_filter();
    let summary = run_blocking(&state, move |service| service.summary(&filter)).await?;
    Ok(Json(summary))
}

/// `GET /api/metas/export.csv` — CSV download of the (filtered) goals.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, ApiError> {
    let filter = params.to_filter();
    let csv = run_blocking(&state, move |service| service.export_csv(&filter)).await?;
    let filename = format!(
        "attachment; filename=\"metas-{}.csv\"",
        chrono::Local::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    )
        .into_response())
}

/// `GET /api/catalogos` — reference divisions, processes and indicators.
pub async fn catalog() -> Json<Catalog> {
    Json(Catalog::standard())
}
