//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    CheckoutRequest, Order, OrderDetail, OrderStatus, PaymentProofSubmit, PaymentStatus,
    VerificationStatus,
};

fn default_limit() -> i32 {
    50
}

fn default_actor() -> String {
    "admin".to_string()
}

/// Query params for listing a shopper's orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub shopper_id: String,
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: i32,
    #[serde(default)]
    pub offset: i32,
}

/// Create an order from the shopper's selected cart lines
pub async fn checkout(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.checkout().create_order(payload).await?;
    Ok(Json(detail))
}

/// List a shopper's orders, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .orders()
        .list_for_shopper(&query.shopper_id, query.status, query.limit, query.offset)
        .await?;
    Ok(Json(orders))
}

/// Optional shopper scope on reads; admins omit it
#[derive(Debug, Deserialize)]
pub struct GetQuery {
    pub shopper_id: Option<String>,
}

/// Order detail with frozen items
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<GetQuery>,
) -> AppResult<Json<OrderDetail>> {
    let detail = match query.shopper_id {
        Some(shopper_id) => state.orders().get_for_shopper(id, &shopper_id).await?,
        None => state.orders().get(id).await?,
    };
    Ok(Json(detail))
}

/// Body identifying the acting shopper
#[derive(Debug, Deserialize)]
pub struct ShopperRef {
    pub shopper_id: String,
}

/// Shopper cancels a not-yet-shipped order; stock is restored
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShopperRef>,
) -> AppResult<Json<Order>> {
    let order = state.orders().cancel(&payload.shopper_id, id).await?;
    Ok(Json(order))
}

/// Shopper confirms the shipment arrived
pub async fn confirm_delivery(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShopperRef>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .confirm_delivery(&payload.shopper_id, id)
        .await?;
    Ok(Json(order))
}

/// Payment proof submission
#[derive(Debug, Deserialize)]
pub struct PaymentProofRequest {
    pub shopper_id: String,
    pub payment_proof: String,
}

pub async fn submit_payment_proof(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentProofRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .submit_payment_proof(
            &payload.shopper_id,
            id,
            PaymentProofSubmit {
                payment_proof: payload.payment_proof,
            },
        )
        .await?;
    Ok(Json(order))
}

/// Admin fulfilment-status override
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    #[serde(default = "default_actor")]
    pub actor: String,
}

pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .set_status(&payload.actor, id, payload.status)
        .await?;
    Ok(Json(order))
}

/// Admin payment-status override
#[derive(Debug, Deserialize)]
pub struct PaymentStatusUpdateRequest {
    pub payment_status: PaymentStatus,
    #[serde(default = "default_actor")]
    pub actor: String,
}

pub async fn set_payment_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentStatusUpdateRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .set_payment_status(&payload.actor, id, payload.payment_status)
        .await?;
    Ok(Json(order))
}

/// Admin payment-proof review verdict
#[derive(Debug, Deserialize)]
pub struct VerificationStatusUpdateRequest {
    pub verification_status: VerificationStatus,
    #[serde(default = "default_actor")]
    pub actor: String,
}

pub async fn set_verification_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<VerificationStatusUpdateRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .set_verification_status(&payload.actor, id, payload.verification_status)
        .await?;
    Ok(Json(order))
}
