//! Catalog endpoints.
//!
//! The dashboard's inventory page lists, adds, edits and deletes items
//! through these. Items that appear on any bill cannot be deleted.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use store_core::validation::validate_search_query;
use store_core::{Item, ItemChanges, NewItem};
use tracing::debug;

use crate::error::ApiResult;
use crate::handler::MessageResponse;
use crate::state::AppState;

/// Query string of `GET /items`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    /// Case-insensitive substring of the item name.
    pub search: Option<String>,
}

/// `GET /items`
pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ItemListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Item>>> {
    let Query(query) = query?;
    let search = validate_search_query(query.search.as_deref())?;

    let items = state.db.items().list(search.as_deref()).await?;
    Ok(Json(items))
}

/// `POST /items`
pub async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(item) = payload?;
    let draft = item.validate()?;

    let id = state.db.items().insert(&draft).await?;
    Ok(Json(MessageResponse::with_id("Item added successfully!", id)))
}

/// `PUT /items/{id}`
///
/// Only the fields present in the body are written. A body with no
/// recognised field is answered with 200 and changes nothing.
pub async fn update_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ItemChanges>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    let changes = changes.validate()?;

    if changes.is_empty() {
        debug!(id, "Item update without recognised fields");
        return Ok(Json(MessageResponse::new("No fields to update")));
    }

    state.db.items().update(id, &changes).await?;
    Ok(Json(MessageResponse::with_id("Item updated successfully!", id)))
}

/// `DELETE /items/{id}`
pub async fn delete_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;

    state.db.items().delete(id).await?;
    Ok(Json(MessageResponse::with_id("Item deleted successfully!", id)))
}
