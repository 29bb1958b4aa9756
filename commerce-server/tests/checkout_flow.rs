//! Checkout and order lifecycle tests
//!
//! Covers the frozen-order contract: cart → checkout → state machine, with
//! stock and cart effects checked after every step.

mod common;

use commerce_server::AppError;
use commerce_server::db::repository::product;
use commerce_server::services::{CartService, CheckoutService, OrderService};
use shared::models::{CartAdd, CheckoutRequest, OrderStatus, PaymentStatus, VerificationStatus};

use common::{seed_product, test_config, test_db};

fn checkout_request(shopper_id: &str) -> CheckoutRequest {
    CheckoutRequest {
        shopper_id: shopper_id.to_string(),
        shipping_address: "Jl. Sudirman No. 1, Jakarta".to_string(),
        recipient_name: "Ayu Lestari".to_string(),
        recipient_phone: "081200001111".to_string(),
        shipping_fee: Some(1_500),
        note: None,
    }
}

async fn add_to_cart(cart: &CartService, shopper: &str, product_id: i64, qty: i64) {
    cart.add(CartAdd {
        shopper_id: shopper.to_string(),
        product_id,
        quantity: qty,
        note: None,
    })
    .await
    .expect("add to cart");
}

#[tokio::test]
async fn checkout_converts_selected_lines_only() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());

    let product_x = seed_product(&db.pool, "Batik Shirt", 10_000, None, 10).await;
    let product_y = seed_product(&db.pool, "Canvas Tote", 5_000, None, 10).await;

    add_to_cart(&cart, "shopper-1", product_x.id, 2).await;
    let line_y = cart
        .add(CartAdd {
            shopper_id: "shopper-1".to_string(),
            product_id: product_y.id,
            quantity: 1,
            note: None,
        })
        .await
        .unwrap();
    cart.toggle_selected(line_y.id).await.unwrap();

    let detail = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .expect("checkout");

    // One order, only productX, frozen total
    assert_eq!(detail.order.total_amount, 20_000);
    assert_eq!(detail.order.grand_total(), 21_500);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(detail.order.verification_status, VerificationStatus::Pending);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product_id, product_x.id);
    assert_eq!(detail.items[0].quantity, 2);
    assert_eq!(detail.items[0].subtotal, 20_000);

    // Stock decremented for X only
    assert_eq!(product::stock(&db.pool, product_x.id).await.unwrap(), Some(8));
    assert_eq!(product::stock(&db.pool, product_y.id).await.unwrap(), Some(10));

    // Purchased line gone, unselected line still present
    let remaining = cart.list("shopper-1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].product_id, product_y.id);
}

#[tokio::test]
async fn checkout_uses_discount_price_at_this_instant() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());

    let product = seed_product(&db.pool, "Denim Jacket", 200_000, Some(150_000), 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 1).await;

    let detail = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 150_000);
    assert_eq!(detail.items[0].price, 150_000);
    assert_eq!(detail.items[0].product_snapshot.price, 150_000);
}

#[tokio::test]
async fn empty_selection_cannot_check_out() {
    let db = test_db().await;
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());

    let err = checkout
        .create_order(checkout_request("shopper-empty"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCheckout));
}

#[tokio::test]
async fn lost_stock_race_rolls_back_everything() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Limited Sneaker", 50_000, None, 2).await;

    // Both shoppers hold 2 in their carts while stock is 2
    add_to_cart(&cart, "shopper-1", product.id, 2).await;
    add_to_cart(&cart, "shopper-2", product.id, 2).await;

    checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .expect("first checkout wins");

    let err = checkout
        .create_order(checkout_request("shopper-2"))
        .await
        .unwrap_err();
    match err {
        AppError::InsufficientStock {
            product_id,
            available,
        } => {
            assert_eq!(product_id, product.id);
            assert_eq!(available, 0);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Loser's world is untouched: cart intact, no order, stock unchanged
    let remaining = cart.list("shopper-2").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].quantity, 2);
    let loser_orders = orders
        .list_for_shopper("shopper-2", None, 50, 0)
        .await
        .unwrap();
    assert!(loser_orders.is_empty());
    assert_eq!(product::stock(&db.pool, product.id).await.unwrap(), Some(0));
}

#[tokio::test]
async fn snapshots_survive_catalog_drift() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Linen Dress", 80_000, None, 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 1).await;

    let created = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();

    // Catalog changes after purchase: price hike, then removal
    product::set_pricing(&db.pool, product.id, 999_000, None)
        .await
        .unwrap();
    product::deactivate(&db.pool, product.id).await.unwrap();

    let detail = orders.get(created.order.id).await.unwrap();
    assert_eq!(detail.order.total_amount, 80_000);
    assert_eq!(detail.items[0].price, 80_000);
    assert_eq!(detail.items[0].product_snapshot.name, "Linen Dress");
    assert_eq!(detail.items[0].product_snapshot.price, 80_000);
}

#[tokio::test]
async fn order_numbers_carry_prefix_date_and_sequence() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let config = test_config();
    let checkout = CheckoutService::new(db.pool.clone(), &config);

    let product = seed_product(&db.pool, "Scarf", 10_000, None, 10).await;

    add_to_cart(&cart, "shopper-1", product.id, 1).await;
    let first = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();
    add_to_cart(&cart, "shopper-1", product.id, 1).await;
    let second = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();

    let number = &first.order.order_number;
    assert!(number.starts_with(&config.order_prefix));
    // PREFIX + YYYYMMDD + 4-digit sequence
    assert_eq!(number.len(), config.order_prefix.len() + 8 + 4);
    assert_eq!(&number[number.len() - 4..], "0001");
    assert_eq!(
        &second.order.order_number[second.order.order_number.len() - 4..],
        "0002"
    );
}

#[tokio::test]
async fn cancel_restores_stock_exactly_once() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Hoodie", 60_000, None, 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 3).await;

    let created = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();
    assert_eq!(product::stock(&db.pool, product.id).await.unwrap(), Some(2));

    let cancelled = orders.cancel("shopper-1", created.order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(product::stock(&db.pool, product.id).await.unwrap(), Some(5));

    // Second cancel is rejected and must not double-restore
    let err = orders
        .cancel("shopper-1", created.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    assert_eq!(product::stock(&db.pool, product.id).await.unwrap(), Some(5));
}

#[tokio::test]
async fn shipped_orders_cannot_be_cancelled() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Cap", 20_000, None, 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 1).await;
    let created = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();
    let id = created.order.id;

    orders
        .set_status("admin", id, OrderStatus::Processing)
        .await
        .unwrap();
    orders
        .set_status("admin", id, OrderStatus::Shipped)
        .await
        .unwrap();

    let err = orders.cancel("shopper-1", id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    // No stock came back
    assert_eq!(product::stock(&db.pool, product.id).await.unwrap(), Some(4));
}

#[tokio::test]
async fn fulfilment_chain_and_delivery_confirmation() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Socks", 8_000, None, 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 1).await;
    let created = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();
    let id = created.order.id;

    // Skipping straight to shipped is rejected
    let err = orders
        .set_status("admin", id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    orders
        .set_status("admin", id, OrderStatus::Processing)
        .await
        .unwrap();
    orders
        .set_status("admin", id, OrderStatus::Shipped)
        .await
        .unwrap();

    let delivered = orders.confirm_delivery("shopper-1", id).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivered_at.is_some());

    // Terminal: nothing moves a delivered order
    let err = orders
        .set_status("admin", id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn payment_and_verification_axes() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Belt", 30_000, None, 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 1).await;
    let created = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();
    let id = created.order.id;

    // Proof upload reopens review and stores the reference
    let with_proof = orders
        .submit_payment_proof(
            "shopper-1",
            id,
            shared::models::PaymentProofSubmit {
                payment_proof: "transfer-20260807.jpg".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        with_proof.payment_proof.as_deref(),
        Some("transfer-20260807.jpg")
    );

    let approved = orders
        .set_verification_status("admin", id, VerificationStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.verification_status, VerificationStatus::Approved);

    let paid = orders
        .set_payment_status("admin", id, PaymentStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert!(paid.paid_at.is_some());

    // Paid again is not a transition
    let err = orders
        .set_payment_status("admin", id, PaymentStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    // Refund only from paid — and it works from here
    let refunded = orders
        .set_payment_status("admin", id, PaymentStatus::Refunded)
        .await
        .unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn foreign_orders_look_missing_to_other_shoppers() {
    let db = test_db().await;
    let cart = CartService::new(db.pool.clone());
    let checkout = CheckoutService::new(db.pool.clone(), &test_config());
    let orders = OrderService::new(db.pool.clone());

    let product = seed_product(&db.pool, "Mug", 12_000, None, 5).await;
    add_to_cart(&cart, "shopper-1", product.id, 1).await;
    let created = checkout
        .create_order(checkout_request("shopper-1"))
        .await
        .unwrap();

    let err = orders
        .cancel("shopper-2", created.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
