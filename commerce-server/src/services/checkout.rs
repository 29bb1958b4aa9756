//! Checkout Service
//!
//! Converts a shopper's selected cart lines into a frozen order. The whole
//! conversion — order number, stock decrements, order + item rows, cart
//! cleanup — commits or rolls back as one SQLite transaction. The sequence
//! upsert runs first so the transaction holds the write lock before any
//! stock validation happens; concurrent checkouts serialize there.

use chrono::Utc;
use chrono_tz::Tz;
use shared::models::{
    CheckoutRequest, Order, OrderDetail, OrderItem, OrderStatus, PaymentStatus, ProductSnapshot,
    VerificationStatus,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use validator::Validate;

use crate::core::Config;
use crate::db::repository::{cart, order, product, sequence};
use crate::utils::{AppError, AppResult};

/// Daily sequence ceiling: order numbers carry four digits
const MAX_DAILY_SEQUENCE: i64 = 9999;

pub struct CheckoutService {
    pool: SqlitePool,
    order_prefix: String,
    default_shipping_fee: i64,
    tz: Tz,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            order_prefix: config.order_prefix.clone(),
            default_shipping_fee: config.default_shipping_fee,
            tz: config.timezone,
        }
    }

    /// Create an order from the shopper's selected cart lines.
    ///
    /// Fails with `EmptyCheckout` when nothing is selected and with
    /// `InsufficientStock` when any line lost the stock race; either way the
    /// transaction rolls back and cart, stock and orders are untouched.
    pub async fn create_order(&self, req: CheckoutRequest) -> AppResult<OrderDetail> {
        req.validate()?;

        let mut tx = self.pool.begin().await?;

        // Order number first: the counter upsert is this transaction's first
        // write, so the write lock is held before stock is examined.
        let date = Utc::now().with_timezone(&self.tz).format("%Y%m%d").to_string();
        let seq = sequence::next(&mut tx, &date).await.map_err(|e| {
            AppError::SequenceExhausted(format!("Order sequence unavailable: {e}"))
        })?;
        if seq > MAX_DAILY_SEQUENCE {
            return Err(AppError::SequenceExhausted(format!(
                "Daily order sequence exhausted for {date}"
            )));
        }
        let order_number = format!("{}{}{:04}", self.order_prefix, date, seq);

        let lines = cart::selected_lines(&mut tx, &req.shopper_id).await?;
        if lines.is_empty() {
            return Err(AppError::EmptyCheckout);
        }

        let now = now_millis();
        let order_id = snowflake_id();
        let mut total_amount: i64 = 0;
        let mut items = Vec::with_capacity(lines.len());

        for line in &lines {
            // Conditional decrement doubles as the stock re-validation; a
            // line that lost the race aborts the whole checkout.
            let decremented =
                product::decrement_stock(&mut tx, line.product_id, line.quantity).await?;
            if !decremented {
                // line.stock was read in this transaction, after the write
                // lock was taken, so it is the authoritative availability
                return Err(AppError::InsufficientStock {
                    product_id: line.product_id,
                    available: line.stock,
                });
            }

            let price = line.effective_price();
            let subtotal = price * line.quantity;
            total_amount += subtotal;

            items.push(OrderItem {
                id: snowflake_id(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price,
                subtotal,
                product_snapshot: ProductSnapshot {
                    id: line.product_id,
                    name: line.name.clone(),
                    price,
                    image: line.image.clone(),
                    category: line.category.clone(),
                },
            });
        }

        let new_order = Order {
            id: order_id,
            shopper_id: req.shopper_id.clone(),
            order_number: order_number.clone(),
            total_amount,
            shipping_fee: req.shipping_fee.unwrap_or(self.default_shipping_fee),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            verification_status: VerificationStatus::Pending,
            payment_proof: None,
            shipping_address: req.shipping_address,
            recipient_name: req.recipient_name,
            recipient_phone: req.recipient_phone,
            note: req.note,
            paid_at: None,
            cancelled_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        };

        order::insert_order(&mut tx, &new_order).await?;
        for item in &items {
            order::insert_item(&mut tx, item).await?;
        }
        cart::delete_selected(&mut tx, &req.shopper_id).await?;

        tx.commit().await?;

        crate::audit_log!(
            new_order.shopper_id.as_str(),
            "checkout",
            format!("orders:{order_id}").as_str(),
            order_number.as_str()
        );
        tracing::info!(
            order_id,
            order_number = %new_order.order_number,
            total_amount,
            item_count = items.len(),
            "Order created"
        );

        Ok(OrderDetail {
            order: new_order,
            items,
        })
    }
}
