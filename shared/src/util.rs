//! Small shared utilities: timestamps and ID generation

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
///
/// Used for every durable row: orders, order items, cart lines, sessions.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Generate an opaque unique key (stream keys, room ids)
pub fn unique_key(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn snowflake_ids_are_positive_and_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let id = snowflake_id();
            assert!(id > 0);
            seen.insert(id);
        }
        // 12 random bits per millisecond; 1000 draws should not all collide
        assert!(seen.len() > 900);
    }

    #[test]
    fn unique_key_carries_prefix() {
        let key = unique_key("sk");
        assert!(key.starts_with("sk_"));
        assert_ne!(key, unique_key("sk"));
    }
}
