//! Catalog Service
//!
//! The commerce core's window onto product data: price, discount, stock.
//! Reads answer from the current catalog rows; the two stock mutations are
//! thin wrappers over the repository's atomic counters so cart, checkout and
//! cancellation all share one locking discipline.

use shared::models::{PriceQuote, Product};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::product;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active product or NotFound
    pub async fn get(&self, product_id: i64) -> AppResult<Product> {
        product::find_active(&self.pool, product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id} not found")))
    }

    pub async fn price(&self, product_id: i64) -> AppResult<PriceQuote> {
        product::price(&self.pool, product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id} not found")))
    }

    pub async fn stock(&self, product_id: i64) -> AppResult<i64> {
        product::stock(&self.pool, product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id} not found")))
    }

    /// Conditional decrement; false when stock would go negative
    pub async fn decrement_stock(
        &self,
        conn: &mut SqliteConnection,
        product_id: i64,
        qty: i64,
    ) -> AppResult<bool> {
        Ok(product::decrement_stock(conn, product_id, qty).await?)
    }

    /// Restore stock (cancellation path)
    pub async fn increment_stock(
        &self,
        conn: &mut SqliteConnection,
        product_id: i64,
        qty: i64,
    ) -> AppResult<()> {
        Ok(product::increment_stock(conn, product_id, qty).await?)
    }
}
