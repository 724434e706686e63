//! Domain types shared across the path algebra, mutation protocols, and
//! service facade.

use crate::db::entities::tree_node;

/// A node row as returned to callers of the service facade.
pub type Node = tree_node::Model;

/// The materialized-path metadata derived for a node: everything the path
/// algebra needs and nothing it has to fetch again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeMeta {
    pub root_id: i64,
    pub path_ids: Vec<i64>,
    pub path_pos: Vec<i64>,
    pub depth: i16,
}

impl NodeMeta {
    pub fn id(&self) -> i64 {
        *self
            .path_ids
            .last()
            .expect("path_ids is never empty: depth >= 1")
    }

    pub fn from_row(row: &Node) -> Self {
        Self {
            root_id: row.root_id,
            path_ids: row.path_ids.clone(),
            path_pos: row.path_pos.clone(),
            depth: row.depth,
        }
    }
}
