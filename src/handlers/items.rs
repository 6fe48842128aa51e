use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::AdminUser,
    errors::ServiceError,
    handlers::AppState,
    services::items::{ItemChanges, NewItem},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Item routes
pub fn item_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/", post(create_item))
        .route("/:id", put(update_item))
        .route("/:id", delete(delete_item))
        .route("/:id/transfer-request", get(transfer_request))
}

/// List all items, partitioned by warehouse
async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ServiceError> {
    let view = state.services.items.index_view().await?;
    Ok(success_response(view))
}

/// Create a new item
async fn create_item(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
    Json(payload): Json<NewItem>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = state.services.items.create(payload).await?;
    Ok(created_response(serde_json::json!({ "id": id })))
}

/// Update an existing item
async fn update_item(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<ItemChanges>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.items.update(id, payload).await?;
    Ok(success_response(item))
}

/// Delete an item together with its pictures
async fn delete_item(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.items.delete(id).await?;
    Ok(no_content_response())
}

/// Build the transfer-request mailto link for an item
async fn transfer_request(
    State(state): State<Arc<AppState>>,
    _user: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = state.services.transfer.build_transfer_request(id).await?;
    Ok(success_response(request))
}
