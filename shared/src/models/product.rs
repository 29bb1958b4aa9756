//! Product Model (catalog view)
//!
//! The catalog itself is managed elsewhere; this crate only needs the fields
//! the commerce core reads: price, discount, stock, and the display data that
//! gets frozen into order snapshots.

use serde::{Deserialize, Serialize};

/// Catalog product row
///
/// Monetary amounts are integer minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// List price
    pub price: i64,
    /// Discount price; when set it wins over `price`
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub stock: i64,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// Price a shopper actually pays right now
    pub fn effective_price(&self) -> i64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Price lookup result for a single product
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceQuote {
    pub list_price: i64,
    pub discount_price: Option<i64>,
}

impl PriceQuote {
    pub fn effective(&self) -> i64 {
        self.discount_price.unwrap_or(self.list_price)
    }
}

/// Create product payload (seeding / demos; catalog CRUD lives elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_price_wins_when_present() {
        let mut p = Product {
            id: 1,
            name: "Batik Shirt".into(),
            price: 150_000,
            discount_price: None,
            image: None,
            category: None,
            stock: 10,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(p.effective_price(), 150_000);
        p.discount_price = Some(120_000);
        assert_eq!(p.effective_price(), 120_000);
    }
}
