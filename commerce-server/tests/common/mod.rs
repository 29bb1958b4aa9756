//! Shared test fixtures: temp-dir database and catalog seeding
#![allow(dead_code)]

use commerce_server::db::{DbService, repository::product};
use shared::models::{Product, ProductCreate};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Pool over a migrated SQLite file in a temp dir; the dir lives as long as
/// the fixture so WAL files stay valid
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("test.db");
    let service = DbService::new(&db_path.to_string_lossy())
        .await
        .expect("open test database");
    TestDb {
        pool: service.pool,
        _dir: dir,
    }
}

pub async fn seed_product(
    pool: &SqlitePool,
    name: &str,
    price: i64,
    discount_price: Option<i64>,
    stock: i64,
) -> Product {
    product::create(
        pool,
        ProductCreate {
            name: name.to_string(),
            price,
            discount_price,
            image: Some(format!("{name}.jpg")),
            category: Some("apparel".to_string()),
            stock,
        },
    )
    .await
    .expect("seed product")
}

/// Config for service construction; checkout only reads prefix, fee and
/// timezone from it, the work dir is never touched by these tests
pub fn test_config() -> commerce_server::Config {
    commerce_server::Config::with_overrides("./target/test-work", 0)
}
