use super::common::{no_content_response, success_response};
use crate::{
    auth::AdminUser,
    errors::ServiceError,
    handlers::AppState,
    services::pictures::UploadFile,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::IntoResponse,
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

/// Picture routes. The body limit bounds whole multipart uploads, so it has
/// to cover every photo in one request, not just a single file.
pub fn picture_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(upload_pictures))
        .route("/:id", delete(delete_picture))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Upload one or more photos for an item.
///
/// Expects a multipart form with an `item_id` field and one `photos` part
/// per file. Parts with other names are ignored.
async fn upload_pictures(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let mut item_id: Option<i32> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("item_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::InvalidInput(format!("unreadable item_id: {}", e)))?;
                let parsed = text.trim().parse::<i32>().map_err(|_| {
                    ServiceError::InvalidInput(format!("item_id is not a number: {:?}", text))
                })?;
                item_id = Some(parsed);
            }
            Some("photos") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::InvalidInput(format!("unreadable file: {}", e)))?;
                files.push(UploadFile {
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let item_id =
        item_id.ok_or_else(|| ServiceError::InvalidInput("item_id field is required".into()))?;

    let pictures = state.services.pictures.upload(item_id, files).await?;
    Ok(success_response(pictures))
}

/// Delete a picture and its file
async fn delete_picture(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.pictures.delete(id).await?;
    Ok(no_content_response())
}
