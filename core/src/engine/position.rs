//! Position allocator: gap-based sibling ordering. No rebalancing is
//! specified (spec §9) — an insert always lands after the current last
//! sibling.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DbBackend, Statement};

use crate::error::Result;

/// Sibling positions are spaced by this much, leaving room for a future
/// mid-group insertion scheme without renumbering existing siblings.
pub const GAP: i64 = 1000;

/// Pick the position for a new last sibling under `parent_id` within
/// `tenant_id`, reading the current maximum via one query in the caller's
/// transaction.
pub async fn next_position<C: ConnectionTrait>(
    conn: &C,
    tenant_id: &str,
    parent_id: Option<i64>,
) -> Result<i64> {
    let row = match parent_id {
        Some(parent_id) => {
            conn.query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT COALESCE(MAX(pos), 0) AS max_pos FROM tree_nodes \
                 WHERE tenant_id = $1 AND parent_id = $2",
                [tenant_id.into(), parent_id.into()],
            ))
            .await?
        }
        None => {
            conn.query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT COALESCE(MAX(pos), 0) AS max_pos FROM tree_nodes \
                 WHERE tenant_id = $1 AND parent_id IS NULL",
                [tenant_id.into()],
            ))
            .await?
        }
    };

    let max_pos: i64 = row
        .expect("COALESCE(MAX(pos), 0) always returns exactly one row")
        .try_get("", "max_pos")?;

    Ok(max_pos + GAP)
}

/// An in-memory, transaction-local allocator used by bulk-load, keyed by
/// `parent_id`. Positions within one parent group are `GAP, 2*GAP, 3*GAP, ...`
/// in the order entries appear in the input batch.
#[derive(Default)]
pub struct BulkPositionAllocator {
    counters: HashMap<Option<i64>, i64>,
}

impl BulkPositionAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, parent_id: Option<i64>) -> i64 {
        let counter = self.counters.entry(parent_id).or_insert(0);
        *counter += GAP;
        *counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_allocator_spaces_siblings_by_gap() {
        let mut alloc = BulkPositionAllocator::new();
        assert_eq!(alloc.next(Some(1)), 1000);
        assert_eq!(alloc.next(Some(1)), 2000);
        assert_eq!(alloc.next(Some(1)), 3000);
    }

    #[test]
    fn bulk_allocator_tracks_each_parent_independently() {
        let mut alloc = BulkPositionAllocator::new();
        assert_eq!(alloc.next(Some(1)), 1000);
        assert_eq!(alloc.next(Some(2)), 1000);
        assert_eq!(alloc.next(Some(1)), 2000);
        assert_eq!(alloc.next(None), 1000);
    }
}
