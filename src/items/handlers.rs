//! Item endpoint handlers.
//!
//! Each handler performs exactly one repository call and maps its outcome to
//! a status and JSON body. Failures are returned as `ApiError` and rendered
//! by the terminal error middleware.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::validate::Validated;
use crate::items::model::{Item, ItemPatch, ItemWithId, ParamsWithId};
use crate::items::repository::ItemRepository;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /api/v1`
pub async fn api_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "API - Hello!".to_string(),
    })
}

/// `GET /api/v1/items`
///
/// An empty store is reported as an error, not as `[]`.
pub async fn list_items(
    State(repository): State<Arc<ItemRepository>>,
) -> Result<Json<Vec<ItemWithId>>, ApiError> {
    let items = repository.list_all();
    if items.is_empty() {
        return Err(ApiError::NoItems);
    }
    Ok(Json(items))
}

/// `GET /api/v1/items/{id}`
pub async fn get_item(
    State(repository): State<Arc<ItemRepository>>,
    validated: Validated<ParamsWithId>,
) -> Result<Json<ItemWithId>, ApiError> {
    let id = validated.params.id;
    repository
        .get_by_id(&id)
        .map(Json)
        .map_err(|_| ApiError::ItemNotFound(id))
}

/// `POST /api/v1/items`
///
/// Responds with the full list including the new item.
pub async fn create_item(
    State(repository): State<Arc<ItemRepository>>,
    validated: Validated<Value, Item>,
) -> (StatusCode, Json<Vec<ItemWithId>>) {
    let items = repository.add(validated.body);
    (StatusCode::CREATED, Json(items))
}

/// `PUT /api/v1/items/{id}`
pub async fn update_item(
    State(repository): State<Arc<ItemRepository>>,
    validated: Validated<ParamsWithId, ItemPatch>,
) -> Result<Json<ItemWithId>, ApiError> {
    let updated = repository.update_by_id(&validated.params.id, validated.body)?;
    Ok(Json(updated))
}

/// `DELETE /api/v1/items/{id}`
pub async fn delete_item(
    State(repository): State<Arc<ItemRepository>>,
    validated: Validated<ParamsWithId>,
) -> Result<Json<ItemWithId>, ApiError> {
    let removed = repository.delete_by_id(&validated.params.id)?;
    Ok(Json(removed))
}
