pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod file_store;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::Router;
use std::sync::Arc;

/// Shared application state passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub services: handlers::AppServices,
}

/// The versioned API surface, mounted under `/api/v1`.
pub fn api_v1_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/items", handlers::items::item_routes())
        .nest("/pictures", handlers::pictures::picture_routes(max_upload_bytes))
        .nest("/reports", handlers::reports::report_routes())
}
