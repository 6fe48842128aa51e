use crate::{auth::AdminUser, errors::ServiceError, handlers::AppState};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::post,
    Router,
};
use std::sync::Arc;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Report routes
pub fn report_routes() -> Router<Arc<AppState>> {
    Router::new().route("/colli", post(export_colli))
}

/// Generate the per-warehouse xlsx summary as a file download
async fn export_colli(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.export_summary().await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(XLSX_CONTENT_TYPE),
    );
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| ServiceError::ReportError(e.to_string()))?,
    );

    Ok((headers, report.bytes))
}
