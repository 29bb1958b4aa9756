//! Order Model
//!
//! Orders are created once by checkout and mutated only through the status
//! state machines below. Money fields are frozen at creation time; the
//! catalog may drift afterwards without touching historical orders.

use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// Status state machines
// =============================================================================

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Forward chain pending → processing → shipped → delivered, with
    /// cancellation allowed while not yet shipped. Delivered and Cancelled
    /// are terminal.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status — independent axis from fulfilment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Unpaid,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn can_transition(self, to: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!((self, to), (Unpaid, Paid) | (Unpaid, Failed) | (Paid, Refunded))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment-proof review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [
        VerificationStatus::Pending,
        VerificationStatus::Approved,
        VerificationStatus::Rejected,
    ];

    pub fn can_transition(self, to: VerificationStatus) -> bool {
        use VerificationStatus::*;
        matches!((self, to), (Pending, Approved) | (Pending, Rejected))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Approved => "APPROVED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Order entity
///
/// `total_amount` equals the sum of its items' subtotals at creation time and
/// is never recomputed. Orders are soft-retained: there is no delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub shopper_id: String,
    pub order_number: String,
    pub total_amount: i64,
    pub shipping_fee: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub verification_status: VerificationStatus,
    pub payment_proof: Option<String>,
    pub shipping_address: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub note: Option<String>,
    pub paid_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn grand_total(&self) -> i64 {
        self.total_amount + self.shipping_fee
    }
}

/// Immutable copy of catalog display data captured at purchase time
///
/// Must render correctly even after the source product is edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    /// Effective unit price at purchase time
    pub price: i64,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Order line with frozen pricing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price at purchase
    pub price: i64,
    /// price * quantity, computed once
    pub subtotal: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub product_snapshot: ProductSnapshot,
}

/// Order with its lines (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Request payloads
// =============================================================================

/// Checkout payload: who is buying and where it ships
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "shopper_id is required"))]
    pub shopper_id: String,
    #[validate(length(min = 5, message = "shipping address is too short"))]
    pub shipping_address: String,
    #[validate(length(min = 1, message = "recipient name is required"))]
    pub recipient_name: String,
    #[validate(length(min = 5, message = "recipient phone is too short"))]
    pub recipient_phone: String,
    /// Overrides the configured default when set
    pub shipping_fee: Option<i64>,
    pub note: Option<String>,
}

/// Shopper-submitted payment proof reference (file handling lives elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentProofSubmit {
    #[validate(length(min = 1, message = "payment proof reference is required"))]
    pub payment_proof: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_forward_chain() {
        use OrderStatus::*;
        assert!(Pending.can_transition(Processing));
        assert!(Processing.can_transition(Shipped));
        assert!(Shipped.can_transition(Delivered));
        // no skipping
        assert!(!Pending.can_transition(Shipped));
        assert!(!Pending.can_transition(Delivered));
        // no going back
        assert!(!Delivered.can_transition(Processing));
        assert!(!Shipped.can_transition(Pending));
    }

    #[test]
    fn cancellation_only_before_shipping() {
        use OrderStatus::*;
        assert!(Pending.can_transition(Cancelled));
        assert!(Processing.can_transition(Cancelled));
        assert!(!Shipped.can_transition(Cancelled));
        assert!(!Delivered.can_transition(Cancelled));
        // terminal states stay terminal
        assert!(!Cancelled.can_transition(Pending));
        assert!(!Cancelled.can_transition(Cancelled));
    }

    #[test]
    fn payment_axis_is_independent() {
        use PaymentStatus::*;
        assert!(Unpaid.can_transition(Paid));
        assert!(Unpaid.can_transition(Failed));
        assert!(Paid.can_transition(Refunded));
        assert!(!Failed.can_transition(Paid));
        assert!(!Refunded.can_transition(Unpaid));
    }

    #[test]
    fn verification_is_single_shot() {
        use VerificationStatus::*;
        assert!(Pending.can_transition(Approved));
        assert!(Pending.can_transition(Rejected));
        assert!(!Approved.can_transition(Rejected));
        assert!(!Rejected.can_transition(Approved));
    }

    #[test]
    fn grand_total_includes_shipping() {
        let order = Order {
            id: 1,
            shopper_id: "shopper-1".into(),
            order_number: "ORD202601010001".into(),
            total_amount: 20_000,
            shipping_fee: 1_500,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            verification_status: VerificationStatus::Pending,
            payment_proof: None,
            shipping_address: "Jl. Sudirman 1".into(),
            recipient_name: "Ayu".into(),
            recipient_phone: "08120000000".into(),
            note: None,
            paid_at: None,
            cancelled_at: None,
            delivered_at: None,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(order.grand_total(), 21_500);
    }
}
