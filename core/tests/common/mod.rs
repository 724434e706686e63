//! Shared integration test setup. These tests hit a real Postgres instance
//! reached through `DATABASE_URL`; when it isn't set they skip with a
//! warning rather than fail, the same assumption `core-new`'s own
//! database-backed tests make about their external resource.

use tree_core::Database;

pub async fn test_db() -> Option<Database> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, skipping integration test");
            return None;
        }
    };

    match Database::connect(&url).await {
        Ok(db) => Some(db),
        Err(err) => {
            tracing::warn!(%err, "could not connect to DATABASE_URL, skipping integration test");
            None
        }
    }
}

/// A tenant id unique to this test invocation so concurrently-run tests
/// never share rows.
pub fn unique_tenant(label: &str) -> String {
    format!("test-{label}-{}", rand::random::<u32>())
}

/// `tree_nodes.id` is a single global primary key, not scoped by tenant —
/// ids are 63-bit random values in production, never small literals. Tests
/// that build a tree by hand need small, readable ids to reason about, so
/// each test call this once and adds the returned base to every id it
/// writes, keeping concurrently-run tests out of each other's primary-key
/// space even though they share one `DATABASE_URL`.
pub fn id_base() -> i64 {
    (rand::random::<u32>() as i64) * 1_000_000
}
