//! Cart Model (per-shopper selection set)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Cart line owned by one shopper
///
/// One row per (shopper, product); adding the same product again merges into
/// the existing line. Quantity is always >= 1 — a line dropped to zero is
/// deleted, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i64,
    pub shopper_id: String,
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub selected: bool,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line joined with live catalog data (list view)
///
/// `unit_price` and `subtotal` are live effective prices — unlike order
/// totals, cart totals follow the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItemDetail {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: i64,
    pub quantity: i64,
    pub subtotal: i64,
    #[serde(default)]
    pub selected: bool,
    pub stock: i64,
    pub note: Option<String>,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartAdd {
    #[validate(length(min = 1, message = "shopper_id is required"))]
    pub shopper_id: String,
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    pub note: Option<String>,
}

/// Quantity update payload; zero or negative removes the line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSetQuantity {
    pub quantity: i64,
}

/// Selected-lines total, computed from live effective prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTotal {
    pub shopper_id: String,
    pub item_count: i64,
    pub total: i64,
}
