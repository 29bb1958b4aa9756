//! Order Service (post-creation state machine)
//!
//! Shoppers may cancel (before shipping) and confirm delivery; everything
//! else is an admin override. Each transition is a guarded conditional
//! update — losing the guard means the order was not in an allowed source
//! state, reported as `InvalidTransition` and never silently coerced.

use shared::models::{
    Order, OrderDetail, OrderStatus, PaymentStatus, PaymentProofSubmit, VerificationStatus,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::repository::{order, product};
use crate::utils::{AppError, AppResult};

pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get(&self, id: i64) -> AppResult<OrderDetail> {
        let order = self.require(id).await?;
        let items = order::items(&self.pool, id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Shopper-facing read; foreign orders are indistinguishable from missing
    pub async fn get_for_shopper(&self, id: i64, shopper_id: &str) -> AppResult<OrderDetail> {
        let detail = self.get(id).await?;
        if detail.order.shopper_id != shopper_id {
            return Err(AppError::not_found(format!("Order {id} not found")));
        }
        Ok(detail)
    }

    pub async fn list_for_shopper(
        &self,
        shopper_id: &str,
        status: Option<OrderStatus>,
        limit: i32,
        offset: i32,
    ) -> AppResult<Vec<Order>> {
        Ok(order::list_by_shopper(&self.pool, shopper_id, status, limit, offset).await?)
    }

    // =========================================================================
    // Admin transitions
    // =========================================================================

    /// Admin fulfilment-status override.
    ///
    /// CANCELLED routes through the stock-restoring cancellation;
    /// DELIVERED stamps `delivered_at`.
    pub async fn set_status(&self, actor: &str, id: i64, to: OrderStatus) -> AppResult<Order> {
        if to == OrderStatus::Cancelled {
            return self.cancel_and_restock(actor, id).await;
        }

        let allowed_from = transition_sources(to);
        if allowed_from.is_empty() {
            // PENDING has no source state; it only exists at creation
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(current.status, to));
        }

        let stamp_col = (to == OrderStatus::Delivered).then_some("delivered_at");
        let mut conn = self.pool.acquire().await?;
        let updated = order::set_status_if(&mut conn, id, to, &allowed_from, stamp_col).await?;
        drop(conn);
        if !updated {
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(current.status, to));
        }

        crate::audit_log!(
            actor,
            "set_status",
            format!("orders:{id}").as_str(),
            to.as_str()
        );
        self.require(id).await
    }

    /// Admin payment-status override; PAID stamps `paid_at`
    pub async fn set_payment_status(
        &self,
        actor: &str,
        id: i64,
        to: PaymentStatus,
    ) -> AppResult<Order> {
        let allowed_from: Vec<PaymentStatus> = PaymentStatus::ALL
            .into_iter()
            .filter(|from| from.can_transition(to))
            .collect();
        if allowed_from.is_empty() {
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(current.payment_status, to));
        }

        let mut conn = self.pool.acquire().await?;
        let updated = order::set_payment_status_if(&mut conn, id, to, &allowed_from).await?;
        drop(conn);
        if !updated {
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(current.payment_status, to));
        }

        crate::audit_log!(
            actor,
            "set_payment_status",
            format!("orders:{id}").as_str(),
            to.as_str()
        );
        self.require(id).await
    }

    /// Admin payment-proof review verdict
    pub async fn set_verification_status(
        &self,
        actor: &str,
        id: i64,
        to: VerificationStatus,
    ) -> AppResult<Order> {
        let allowed_from: Vec<VerificationStatus> = VerificationStatus::ALL
            .into_iter()
            .filter(|from| from.can_transition(to))
            .collect();
        if allowed_from.is_empty() {
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(current.verification_status, to));
        }

        let mut conn = self.pool.acquire().await?;
        let updated = order::set_verification_status_if(&mut conn, id, to, &allowed_from).await?;
        drop(conn);
        if !updated {
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(current.verification_status, to));
        }

        crate::audit_log!(
            actor,
            "set_verification_status",
            format!("orders:{id}").as_str(),
            to.as_str()
        );
        self.require(id).await
    }

    // =========================================================================
    // Shopper operations
    // =========================================================================

    /// Shopper cancellation; allowed while PENDING or PROCESSING
    pub async fn cancel(&self, shopper_id: &str, id: i64) -> AppResult<Order> {
        // ownership check before touching anything
        let current = self.require(id).await?;
        if current.shopper_id != shopper_id {
            return Err(AppError::not_found(format!("Order {id} not found")));
        }
        self.cancel_and_restock(shopper_id, id).await
    }

    /// Shopper confirms the shipment arrived; SHIPPED -> DELIVERED
    pub async fn confirm_delivery(&self, shopper_id: &str, id: i64) -> AppResult<Order> {
        let current = self.require(id).await?;
        if current.shopper_id != shopper_id {
            return Err(AppError::not_found(format!("Order {id} not found")));
        }

        let mut conn = self.pool.acquire().await?;
        let updated = order::set_status_if(
            &mut conn,
            id,
            OrderStatus::Delivered,
            &[OrderStatus::Shipped],
            Some("delivered_at"),
        )
        .await?;
        drop(conn);
        if !updated {
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(
                current.status,
                OrderStatus::Delivered,
            ));
        }
        self.require(id).await
    }

    /// Shopper attaches a payment proof reference for review
    pub async fn submit_payment_proof(
        &self,
        shopper_id: &str,
        id: i64,
        req: PaymentProofSubmit,
    ) -> AppResult<Order> {
        req.validate()?;
        let current = self.require(id).await?;
        if current.shopper_id != shopper_id {
            return Err(AppError::not_found(format!("Order {id} not found")));
        }

        let mut conn = self.pool.acquire().await?;
        let updated = order::set_payment_proof(&mut conn, id, &req.payment_proof).await?;
        drop(conn);
        if !updated {
            return Err(AppError::conflict(format!(
                "Order {id} is no longer awaiting payment"
            )));
        }
        self.require(id).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn require(&self, id: i64) -> AppResult<Order> {
        order::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))
    }

    /// Cancel and restore stock, atomically and exactly once.
    ///
    /// The guarded status flip is the transaction's first write; when it
    /// loses (already cancelled, already shipped) nothing else runs, so a
    /// repeated cancel can never double-restore stock.
    async fn cancel_and_restock(&self, actor: &str, id: i64) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        let updated = order::set_status_if(
            &mut tx,
            id,
            OrderStatus::Cancelled,
            &[OrderStatus::Pending, OrderStatus::Processing],
            Some("cancelled_at"),
        )
        .await?;
        if !updated {
            drop(tx);
            let current = self.require(id).await?;
            return Err(AppError::invalid_transition(
                current.status,
                OrderStatus::Cancelled,
            ));
        }

        // Inverse of checkout's decrement, same rows, same lock discipline
        let items = order::items_in_tx(&mut tx, id).await?;
        for item in &items {
            product::increment_stock(&mut tx, item.product_id, item.quantity).await?;
        }

        tx.commit().await?;

        crate::audit_log!(actor, "cancel", format!("orders:{id}").as_str());
        tracing::info!(order_id = id, restored_lines = items.len(), "Order cancelled, stock restored");

        self.require(id).await
    }
}

/// Source states from which `to` is reachable
fn transition_sources(to: OrderStatus) -> Vec<OrderStatus> {
    OrderStatus::ALL
        .into_iter()
        .filter(|from| from.can_transition(to))
        .collect()
}
