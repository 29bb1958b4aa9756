//! Order Repository
//!
//! Orders are inserted once by checkout and then mutated only through the
//! guarded status updates below. Every guard is a single conditional UPDATE;
//! `false` means the order was not in an allowed source state.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, OrderStatus, PaymentStatus, VerificationStatus};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str = "id, shopper_id, order_number, total_amount, shipping_fee, status, \
    payment_status, verification_status, payment_proof, shipping_address, recipient_name, \
    recipient_phone, note, paid_at, cancelled_at, delivered_at, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, price, subtotal, product_snapshot";

// =============================================================================
// Creation (checkout transaction only)
// =============================================================================

pub async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO orders ({ORDER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(order.id)
    .bind(&order.shopper_id)
    .bind(&order.order_number)
    .bind(order.total_amount)
    .bind(order.shipping_fee)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.verification_status)
    .bind(&order.payment_proof)
    .bind(&order.shipping_address)
    .bind(&order.recipient_name)
    .bind(&order.recipient_phone)
    .bind(&order.note)
    .bind(order.paid_at)
    .bind(order.cancelled_at)
    .bind(order.delivered_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO order_item ({ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.price)
    .bind(item.subtotal)
    .bind(sqlx::types::Json(&item.product_snapshot))
    .execute(conn)
    .await?;
    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order =
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(order)
}

pub async fn find_by_number(pool: &SqlitePool, order_number: &str) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?"
    ))
    .bind(order_number)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn list_by_shopper(
    pool: &SqlitePool,
    shopper_id: &str,
    status: Option<OrderStatus>,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<Order>> {
    let orders = match status {
        Some(status) => {
            sqlx::query_as::<_, Order>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE shopper_id = ? AND status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(shopper_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Order>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE shopper_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(shopper_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(orders)
}

pub async fn items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Items read inside a transaction (cancellation stock restore)
pub async fn items_in_tx(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

// =============================================================================
// Guarded status updates
// =============================================================================

fn status_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// `status -> to` iff the current status is in `allowed_from`.
///
/// `stamp_col` optionally stamps a lifecycle timestamp (cancelled_at,
/// delivered_at) in the same statement.
pub async fn set_status_if(
    conn: &mut SqliteConnection,
    id: i64,
    to: OrderStatus,
    allowed_from: &[OrderStatus],
    stamp_col: Option<&'static str>,
) -> RepoResult<bool> {
    if allowed_from.is_empty() {
        return Err(RepoError::Validation("allowed_from cannot be empty".into()));
    }
    let now = now_millis();
    let stamp = stamp_col.map(|col| format!(", {col} = ?")).unwrap_or_default();
    let query_str = format!(
        "UPDATE orders SET status = ?, updated_at = ?{stamp} WHERE id = ? AND status IN ({})",
        status_placeholders(allowed_from.len())
    );

    let mut query = sqlx::query(&query_str).bind(to).bind(now);
    if stamp_col.is_some() {
        query = query.bind(now);
    }
    query = query.bind(id);
    for from in allowed_from {
        query = query.bind(*from);
    }

    let rows = query.execute(conn).await?;
    Ok(rows.rows_affected() > 0)
}

/// `payment_status -> to` iff the current payment status is in `allowed_from`;
/// stamps `paid_at` when moving to PAID
pub async fn set_payment_status_if(
    conn: &mut SqliteConnection,
    id: i64,
    to: PaymentStatus,
    allowed_from: &[PaymentStatus],
) -> RepoResult<bool> {
    if allowed_from.is_empty() {
        return Err(RepoError::Validation("allowed_from cannot be empty".into()));
    }
    let now = now_millis();
    let stamp = if to == PaymentStatus::Paid {
        ", paid_at = ?"
    } else {
        ""
    };
    let query_str = format!(
        "UPDATE orders SET payment_status = ?, updated_at = ?{stamp} WHERE id = ? AND payment_status IN ({})",
        status_placeholders(allowed_from.len())
    );

    let mut query = sqlx::query(&query_str).bind(to).bind(now);
    if to == PaymentStatus::Paid {
        query = query.bind(now);
    }
    query = query.bind(id);
    for from in allowed_from {
        query = query.bind(*from);
    }

    let rows = query.execute(conn).await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_verification_status_if(
    conn: &mut SqliteConnection,
    id: i64,
    to: VerificationStatus,
    allowed_from: &[VerificationStatus],
) -> RepoResult<bool> {
    if allowed_from.is_empty() {
        return Err(RepoError::Validation("allowed_from cannot be empty".into()));
    }
    let query_str = format!(
        "UPDATE orders SET verification_status = ?, updated_at = ? WHERE id = ? AND verification_status IN ({})",
        status_placeholders(allowed_from.len())
    );

    let mut query = sqlx::query(&query_str).bind(to).bind(now_millis()).bind(id);
    for from in allowed_from {
        query = query.bind(*from);
    }

    let rows = query.execute(conn).await?;
    Ok(rows.rows_affected() > 0)
}

/// Attach a payment proof while the order still awaits payment.
///
/// Re-submitting after a rejection reopens the review, so the verification
/// status drops back to PENDING here.
pub async fn set_payment_proof(
    conn: &mut SqliteConnection,
    id: i64,
    payment_proof: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_proof = ?, verification_status = 'PENDING', updated_at = ? \
         WHERE id = ? AND payment_status = 'UNPAID' AND status IN ('PENDING', 'PROCESSING')",
    )
    .bind(payment_proof)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}
