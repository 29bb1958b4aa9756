//! Product Repository (catalog reads + stock counters)
//!
//! Stock moves only through the conditional decrement / increment below;
//! nothing in this crate reads stock into memory and writes it back.

use super::{RepoError, RepoResult};
use shared::models::{PriceQuote, Product, ProductCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const PRODUCT_COLUMNS: &str = "id, name, price, discount_price, image, category, stock, is_active, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Find an active product, the only kind shoppers may interact with
pub async fn find_active(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ? AND is_active = 1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn price(pool: &SqlitePool, id: i64) -> RepoResult<Option<PriceQuote>> {
    let quote = sqlx::query_as::<_, (i64, Option<i64>)>(
        "SELECT price, discount_price FROM product WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|(list_price, discount_price)| PriceQuote {
        list_price,
        discount_price,
    });
    Ok(quote)
}

pub async fn stock(pool: &SqlitePool, id: i64) -> RepoResult<Option<i64>> {
    let stock = sqlx::query_scalar::<_, i64>("SELECT stock FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(stock)
}

/// Conditional decrement: succeeds only when enough stock remains.
///
/// This single statement is the oversell enforcement primitive — concurrent
/// callers serialize on the row and at most `stock` units ever get taken.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: i64,
    qty: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE product SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
    )
    .bind(qty)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Inverse of [`decrement_stock`], used by cancellation
pub async fn increment_stock(conn: &mut SqliteConnection, id: i64, qty: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
        .bind(qty)
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}

/// Create a product (seeding and tests; catalog CRUD is managed elsewhere)
pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.price < 0 || data.discount_price.is_some_and(|p| p < 0) {
        return Err(RepoError::Validation("price cannot be negative".into()));
    }
    if data.stock < 0 {
        return Err(RepoError::Validation("stock cannot be negative".into()));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO product (id, name, price, discount_price, image, category, stock, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.price)
    .bind(data.discount_price)
    .bind(&data.image)
    .bind(&data.category)
    .bind(data.stock)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Update price/discount/stock directly (tests exercising catalog drift)
pub async fn set_pricing(
    pool: &SqlitePool,
    id: i64,
    price: i64,
    discount_price: Option<i64>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE product SET price = ?, discount_price = ?, updated_at = ? WHERE id = ?",
    )
    .bind(price)
    .bind(discount_price)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}

/// Soft-remove from the catalog; historical order snapshots must not notice
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE product SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}
