//! Cart API Handlers
//!
//! The shopper identity travels in the request; authentication is mounted in
//! front of this router by the deployment, not here.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{CartAdd, CartItem, CartItemDetail, CartSetQuantity, CartTotal};

/// Query params identifying the shopper
#[derive(Debug, Deserialize)]
pub struct ShopperQuery {
    pub shopper_id: String,
}

/// Body identifying the shopper (bulk selection ops)
#[derive(Debug, Deserialize)]
pub struct ShopperRef {
    pub shopper_id: String,
}

/// List the shopper's cart with live catalog data
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ShopperQuery>,
) -> AppResult<Json<Vec<CartItemDetail>>> {
    let items = state.cart().list(&query.shopper_id).await?;
    Ok(Json(items))
}

/// Add a product to the cart (merges into an existing line)
pub async fn add(
    State(state): State<ServerState>,
    Json(payload): Json<CartAdd>,
) -> AppResult<Json<CartItem>> {
    let item = state.cart().add(payload).await?;
    Ok(Json(item))
}

/// Set a line's quantity; <= 0 removes it and returns null
pub async fn set_quantity(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CartSetQuantity>,
) -> AppResult<Json<Option<CartItem>>> {
    let item = state.cart().set_quantity(id, payload.quantity).await?;
    Ok(Json(item))
}

/// Flip one line's selected flag
pub async fn toggle_selected(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CartItem>> {
    let item = state.cart().toggle_selected(id).await?;
    Ok(Json(item))
}

/// Select every line in the shopper's cart
pub async fn select_all(
    State(state): State<ServerState>,
    Json(payload): Json<ShopperRef>,
) -> AppResult<Json<u64>> {
    let affected = state.cart().select_all(&payload.shopper_id).await?;
    Ok(Json(affected))
}

/// Unselect every line in the shopper's cart
pub async fn unselect_all(
    State(state): State<ServerState>,
    Json(payload): Json<ShopperRef>,
) -> AppResult<Json<u64>> {
    let affected = state.cart().unselect_all(&payload.shopper_id).await?;
    Ok(Json(affected))
}

/// Remove one line
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.cart().remove(id).await?;
    Ok(Json(true))
}

/// Live total over the selected lines
pub async fn selected_total(
    State(state): State<ServerState>,
    Query(query): Query<ShopperQuery>,
) -> AppResult<Json<CartTotal>> {
    let total = state.cart().selected_total(&query.shopper_id).await?;
    Ok(Json(total))
}
