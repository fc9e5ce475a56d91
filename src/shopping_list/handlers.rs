//! REST API handlers for shopping list operations
//!
//! This module implements the HTTP endpoints for listing, fetching,
//! creating and checking off shopping list items.

use super::{
    helpers::item_location,
    models::*,
    state::SharedState,
    validation::{ItemId, ValidatedJson, ValidationError},
};
use crate::error::{AppError, AppResult};
use axum::{
    extract::{OriginalUri, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

/// Creates routes for shopping list operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(COLLECTION_PATH, get(list_items).post(create_item))
        .route("/shoppinglist/purchased", get(non_numeric_item_id).post(mark_purchased))
        .route("/shoppinglist/unpurchased", get(non_numeric_item_id).post(mark_unpurchased))
        .route("/shoppinglist/:id", get(get_item))
}

/// Endpoint: GET /shoppinglist
/// Returns every item, newest first, wrapped as `{ "_embedded": [...] }`.
async fn list_items(State(state): State<SharedState>) -> Json<EmbeddedList<Item>> {
    Json(state.store.list().into())
}

/// Endpoint: GET /shoppinglist/:id
async fn get_item(State(state): State<SharedState>, ItemId(id): ItemId) -> AppResult<Json<Item>> {
    Ok(Json(state.store.get(&id)?))
}

/// Endpoint: GET /shoppinglist/purchased, GET /shoppinglist/unpurchased
/// These paths take precedence over `/shoppinglist/:id`, so a GET here is a
/// lookup by a non-numeric id.
async fn non_numeric_item_id() -> AppError {
    ValidationError::non_numeric_id().into()
}

/// Endpoint: POST /shoppinglist
/// Stores a new item and answers 201 with its URL in `Location`.
async fn create_item(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    ValidatedJson(new_item): ValidatedJson<NewItemPayload>,
) -> impl IntoResponse {
    let item = state.store.create(new_item);
    let location = item_location(&headers, &state.config.authority(), uri.path(), &item.id);

    tracing::info!(id = %item.id, description = %item.description, "Item created");

    (StatusCode::CREATED, [(LOCATION, location)], Json(item))
}

/// Endpoint: POST /shoppinglist/purchased
async fn mark_purchased(
    State(state): State<SharedState>,
    ValidatedJson(item): ValidatedJson<ItemPayload>,
) -> AppResult<Json<Item>> {
    let updated = state.store.mark_purchased(&item.id)?;
    tracing::info!(id = %updated.id, "Item marked purchased");
    Ok(Json(updated))
}

/// Endpoint: POST /shoppinglist/unpurchased
async fn mark_unpurchased(
    State(state): State<SharedState>,
    ValidatedJson(item): ValidatedJson<ItemPayload>,
) -> AppResult<Json<Item>> {
    let updated = state.store.mark_unpurchased(&item.id)?;
    tracing::info!(id = %updated.id, "Item marked unpurchased");
    Ok(Json(updated))
}
