//! Domain models
//!
//! One module per aggregate. Entity structs map 1:1 onto durable rows;
//! `*Create` / `*Update` structs are the mutation payloads exposed to clients.

pub mod cart;
pub mod live_session;
pub mod order;
pub mod product;

pub use cart::{CartAdd, CartItem, CartItemDetail, CartSetQuantity, CartTotal};
pub use live_session::{
    LiveSession, LiveSessionCreate, LiveSessionDetail, LiveSessionUpdate, LiveStatus,
    SessionStats, ShowcaseEntry, ShowcaseItemDetail, ShowcaseReplace, ShowcaseReplaceEntry,
    ViewerCountUpdate,
};
pub use order::{
    CheckoutRequest, Order, OrderDetail, OrderItem, OrderStatus, PaymentProofSubmit,
    PaymentStatus, ProductSnapshot, VerificationStatus,
};
pub use product::{PriceQuote, Product, ProductCreate};
