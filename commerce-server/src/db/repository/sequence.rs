//! Order Sequence Repository
//!
//! One counter row per business date. The upsert below is atomic — the read
//! and the increment are one statement, so concurrent checkouts on the same
//! date can never observe the same value.

use super::RepoResult;
use sqlx::SqliteConnection;

/// Next sequence value for `date` (format YYYYMMDD), starting at 1.
///
/// Runs inside the checkout transaction and is its first write, which makes
/// the transaction take the database write lock up front.
pub async fn next(conn: &mut SqliteConnection, date: &str) -> RepoResult<i64> {
    let value = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_sequence (seq_date, value) VALUES (?, 1) \
         ON CONFLICT (seq_date) DO UPDATE SET value = value + 1 \
         RETURNING value",
    )
    .bind(date)
    .fetch_one(conn)
    .await?;
    Ok(value)
}
