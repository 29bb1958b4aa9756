//! Cart Repository (per-shopper selection set)
//!
//! Pure SQL; stock validation against the catalog lives in the cart service.

use super::{RepoError, RepoResult};
use shared::models::{CartItem, CartItemDetail};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const CART_COLUMNS: &str = "id, shopper_id, product_id, quantity, selected, note, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CartItem>> {
    let item = sqlx::query_as::<_, CartItem>(&format!(
        "SELECT {CART_COLUMNS} FROM cart_item WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Find the line for one (shopper, product) pair, if any
pub async fn find_line(
    pool: &SqlitePool,
    shopper_id: &str,
    product_id: i64,
) -> RepoResult<Option<CartItem>> {
    let item = sqlx::query_as::<_, CartItem>(&format!(
        "SELECT {CART_COLUMNS} FROM cart_item WHERE shopper_id = ? AND product_id = ?"
    ))
    .bind(shopper_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Cart lines joined with live catalog data, newest first
pub async fn list_details(pool: &SqlitePool, shopper_id: &str) -> RepoResult<Vec<CartItemDetail>> {
    let items = sqlx::query_as::<_, CartItemDetail>(
        "SELECT c.id, c.product_id, p.name, p.image, \
         COALESCE(p.discount_price, p.price) AS unit_price, c.quantity, \
         COALESCE(p.discount_price, p.price) * c.quantity AS subtotal, \
         c.selected, p.stock, c.note \
         FROM cart_item c JOIN product p ON p.id = c.product_id \
         WHERE c.shopper_id = ? ORDER BY c.created_at DESC",
    )
    .bind(shopper_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn insert(
    pool: &SqlitePool,
    shopper_id: &str,
    product_id: i64,
    quantity: i64,
    note: Option<&str>,
) -> RepoResult<CartItem> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO cart_item (id, shopper_id, product_id, quantity, selected, note, created_at, updated_at) VALUES (?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(id)
    .bind(shopper_id)
    .bind(product_id)
    .bind(quantity)
    .bind(note)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create cart item".into()))
}

pub async fn update_quantity(pool: &SqlitePool, id: i64, quantity: i64) -> RepoResult<CartItem> {
    let rows = sqlx::query("UPDATE cart_item SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cart item {id} not found")))
}

pub async fn toggle_selected(pool: &SqlitePool, id: i64) -> RepoResult<CartItem> {
    let rows = sqlx::query(
        "UPDATE cart_item SET selected = CASE WHEN selected = 0 THEN 1 ELSE 0 END, updated_at = ? WHERE id = ?",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cart item {id} not found")))
}

/// Flip every line for the shopper; affects zero rows on an empty cart
pub async fn set_all_selected(
    pool: &SqlitePool,
    shopper_id: &str,
    selected: bool,
) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE cart_item SET selected = ?, updated_at = ? WHERE shopper_id = ?")
        .bind(selected)
        .bind(now_millis())
        .bind(shopper_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM cart_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart item {id} not found")));
    }
    Ok(())
}

/// Selected-lines count and live total for one shopper
pub async fn selected_total(pool: &SqlitePool, shopper_id: &str) -> RepoResult<(i64, i64)> {
    let (count, total) = sqlx::query_as::<_, (i64, Option<i64>)>(
        "SELECT COUNT(*), SUM(COALESCE(p.discount_price, p.price) * c.quantity) \
         FROM cart_item c JOIN product p ON p.id = c.product_id \
         WHERE c.shopper_id = ? AND c.selected = 1",
    )
    .bind(shopper_id)
    .fetch_one(pool)
    .await?;
    Ok((count, total.unwrap_or(0)))
}

/// One selected cart line joined with the catalog row, as seen by checkout
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SelectedLine {
    pub cart_item_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub name: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub stock: i64,
}

impl SelectedLine {
    pub fn effective_price(&self) -> i64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Load the shopper's selected lines inside the checkout transaction
pub async fn selected_lines(
    conn: &mut SqliteConnection,
    shopper_id: &str,
) -> RepoResult<Vec<SelectedLine>> {
    let lines = sqlx::query_as::<_, SelectedLine>(
        "SELECT c.id AS cart_item_id, c.product_id, c.quantity, \
         p.name, p.image, p.category, p.price, p.discount_price, p.stock \
         FROM cart_item c JOIN product p ON p.id = c.product_id \
         WHERE c.shopper_id = ? AND c.selected = 1 AND p.is_active = 1 \
         ORDER BY c.created_at",
    )
    .bind(shopper_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Remove the purchased lines (checkout step 7, inside the transaction)
pub async fn delete_selected(conn: &mut SqliteConnection, shopper_id: &str) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM cart_item WHERE shopper_id = ? AND selected = 1")
        .bind(shopper_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}
