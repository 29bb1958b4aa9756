//! Cart API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::add))
        .route("/total", get(handler::selected_total))
        .route("/select-all", post(handler::select_all))
        .route("/unselect-all", post(handler::unselect_all))
        .route("/{id}", put(handler::set_quantity).delete(handler::remove))
        .route("/{id}/toggle", post(handler::toggle_selected))
}
