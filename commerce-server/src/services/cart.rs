//! Cart Service (selection set)
//!
//! Every quantity change re-validates against current stock before it is
//! applied; a violation rejects the mutation outright. The check here is a
//! courtesy to the shopper — the binding enforcement stays in checkout's
//! conditional decrement.

use shared::models::{CartAdd, CartItem, CartItemDetail, CartTotal};
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::repository::cart;
use crate::services::CatalogService;
use crate::utils::{AppError, AppResult};

pub struct CartService {
    pool: SqlitePool,
    catalog: CatalogService,
}

impl CartService {
    pub fn new(pool: SqlitePool) -> Self {
        let catalog = CatalogService::new(pool.clone());
        Self { pool, catalog }
    }

    /// Add a product; an existing line for the same product absorbs the
    /// quantity instead of creating a second line
    pub async fn add(&self, req: CartAdd) -> AppResult<CartItem> {
        req.validate()?;
        let product = self.catalog.get(req.product_id).await?;

        let existing = cart::find_line(&self.pool, &req.shopper_id, req.product_id).await?;
        let merged_qty = existing.as_ref().map_or(0, |line| line.quantity) + req.quantity;
        if merged_qty > product.stock {
            return Err(AppError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
            });
        }

        let item = match existing {
            Some(line) => cart::update_quantity(&self.pool, line.id, merged_qty).await?,
            None => {
                cart::insert(
                    &self.pool,
                    &req.shopper_id,
                    req.product_id,
                    req.quantity,
                    req.note.as_deref(),
                )
                .await?
            }
        };
        Ok(item)
    }

    /// Set a line's quantity; zero or below removes the line (returns None)
    pub async fn set_quantity(&self, id: i64, quantity: i64) -> AppResult<Option<CartItem>> {
        let line = cart::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Cart item {id} not found")))?;

        if quantity <= 0 {
            cart::delete(&self.pool, id).await?;
            return Ok(None);
        }

        let stock = self.catalog.stock(line.product_id).await?;
        if quantity > stock {
            return Err(AppError::InsufficientStock {
                product_id: line.product_id,
                available: stock,
            });
        }

        let item = cart::update_quantity(&self.pool, id, quantity).await?;
        Ok(Some(item))
    }

    pub async fn toggle_selected(&self, id: i64) -> AppResult<CartItem> {
        Ok(cart::toggle_selected(&self.pool, id).await?)
    }

    pub async fn select_all(&self, shopper_id: &str) -> AppResult<u64> {
        Ok(cart::set_all_selected(&self.pool, shopper_id, true).await?)
    }

    pub async fn unselect_all(&self, shopper_id: &str) -> AppResult<u64> {
        Ok(cart::set_all_selected(&self.pool, shopper_id, false).await?)
    }

    pub async fn remove(&self, id: i64) -> AppResult<()> {
        Ok(cart::delete(&self.pool, id).await?)
    }

    pub async fn list(&self, shopper_id: &str) -> AppResult<Vec<CartItemDetail>> {
        Ok(cart::list_details(&self.pool, shopper_id).await?)
    }

    /// Live total over selected lines only
    pub async fn selected_total(&self, shopper_id: &str) -> AppResult<CartTotal> {
        let (item_count, total) = cart::selected_total(&self.pool, shopper_id).await?;
        Ok(CartTotal {
            shopper_id: shopper_id.to_string(),
            item_count,
            total,
        })
    }
}
