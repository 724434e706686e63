//! Path algebra: pure computation of `(root_id, path_ids, path_pos, depth)`
//! for new, moved, and cloned nodes. No database access here — every
//! function takes the metadata it needs and returns a new `NodeMeta` or a
//! typed error.

use crate::domain::NodeMeta;
use crate::error::{Result, TreeError};

/// `depth` is stored as `SMALLINT`; this is its ceiling (spec invariant #3).
pub const MAX_DEPTH: i16 = 32767;

/// Derive the metadata for a brand-new root node.
pub fn derive_for_root(id: i64, pos: i64) -> NodeMeta {
    NodeMeta {
        root_id: id,
        path_ids: vec![id],
        path_pos: vec![pos],
        depth: 1,
    }
}

/// Derive the metadata for a new child of `parent`.
pub fn derive_for_child(parent: &NodeMeta, id: i64, pos: i64) -> Result<NodeMeta> {
    let depth = parent.depth as i32 + 1;
    if depth > MAX_DEPTH as i32 {
        return Err(TreeError::DepthExceeded(depth));
    }

    let mut path_ids = parent.path_ids.clone();
    path_ids.push(id);
    let mut path_pos = parent.path_pos.clone();
    path_pos.push(pos);

    Ok(NodeMeta {
        root_id: parent.root_id,
        path_ids,
        path_pos,
        depth: depth as i16,
    })
}

/// Rewrite a descendant's path after its ancestor `source_id` has been
/// re-anchored to `new_anchor` (the source's own freshly-derived metadata).
/// The prefix of `old_meta` up to and including `source_id` is replaced by
/// `new_anchor`'s full path; the suffix below `source_id` is kept.
///
/// Fails with `Internal` if `source_id` does not appear in `old_meta.path_ids`
/// — that would mean the descendant selection query was wrong, an invariant
/// violation rather than a caller error.
pub fn rewrite_descendant(old_meta: &NodeMeta, new_anchor: &NodeMeta, source_id: i64) -> Result<NodeMeta> {
    let k = old_meta
        .path_ids
        .iter()
        .position(|&id| id == source_id)
        .ok_or_else(|| {
            TreeError::Internal(format!(
                "source {source_id} not found in descendant path {:?}",
                old_meta.path_ids
            ))
        })?;

    let mut path_ids = new_anchor.path_ids.clone();
    path_ids.extend_from_slice(&old_meta.path_ids[k + 1..]);
    let mut path_pos = new_anchor.path_pos.clone();
    path_pos.extend_from_slice(&old_meta.path_pos[k + 1..]);

    let depth = path_ids.len();
    if depth > MAX_DEPTH as usize {
        return Err(TreeError::DepthExceeded(depth as i32));
    }

    Ok(NodeMeta {
        root_id: new_anchor.root_id,
        path_ids,
        path_pos,
        depth: depth as i16,
    })
}
