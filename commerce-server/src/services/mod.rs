//! Domain services
//!
//! Services own the business rules and transaction boundaries; repositories
//! underneath them own the SQL.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod live;
pub mod notification;
pub mod order;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use live::LiveSessionService;
pub use notification::{NoopNotifier, StreamNotifier, WebhookNotifier};
pub use order::OrderService;
