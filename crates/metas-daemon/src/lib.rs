//! # metas-daemon
//!
//! HTTP surface for Metas goal registration.
//!
//! | Route                        | Handler                  |
//! |------------------------------|--------------------------|
//! | `POST /api/metas/`           | [`api::create_meta`]     |
//! | `GET /api/metas/`            | [`api::list_metas`]      |
//! | `GET /api/metas/{id}`        | [`api::get_meta`]        |
//! | `GET /api/metas/resumen`     | [`api::summary`]         |
//! | `GET /api/metas/export.csv`  | [`api::export_csv`]      |
//! | `GET /api/catalogos`         | [`api::catalog`]         |
//! | `GET /`                      | [`web::index`]           |
//! | `GET /metas/{id}`            | [`web::detail`]          |
//! | `GET /healthz`               | liveness check           |
//!
//! The storage handle is owned by [`AppState`] and passed to handlers
//! through axum state; nothing is process-global.

pub mod api;
pub mod config;
pub mod web;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use metas_core::{EventDispatcher, LogSink, MetaError, MetaService, MetaStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::DaemonConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MetaService>,
}

impl AppState {
    pub fn new(service: MetaService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Open the configured database and wire the event log.
pub fn build_service(config: &DaemonConfig) -> Result<MetaService, MetaError> {
    let store = MetaStore::open(&config.database)?;
    let events = EventDispatcher::new().with_sink(Box::new(LogSink::new(&config.events_log)));
    Ok(MetaService::new(store, events))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web::index))
        .route("/metas/{id}", get(web::detail))
        .route("/healthz", get(healthz))
        .route("/api/catalogos", get(api::catalog))
        .route(
            "/api/metas",
            get(api::list_metas).post(api::create_meta),
        )
        .route(
            "/api/metas/",
            get(api::list_metas).post(api::create_meta),
        )
        .route("/api/metas/resumen", get(api::summary))
        .route("/api/metas/export.csv", get(api::export_csv))
        .route("/api/metas/{id}", get(api::get_meta))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for a loaded config, with CORS applied when enabled.
pub fn app(state: AppState, config: &DaemonConfig) -> Router {
    let router = router(state);
    if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn healthz() -> &'static str {
    "ok"
}
