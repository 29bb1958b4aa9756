//! Order API module
//!
//! Shopper routes and admin override routes share the resource; the admin
//! group is kept on its own paths so an authorization layer can be mounted
//! in front of `/status`, `/payment-status` and `/verification-status`.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/checkout", post(handler::checkout))
        .route("/{id}", get(handler::get_by_id))
        // Shopper actions
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/confirm-delivery", post(handler::confirm_delivery))
        .route("/{id}/payment-proof", post(handler::submit_payment_proof))
        // Admin overrides
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/payment-status", put(handler::set_payment_status))
        .route(
            "/{id}/verification-status",
            put(handler::set_verification_status),
        )
}
