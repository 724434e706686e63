//! Mutation protocols: insert, move, clone, bulk-load, delete-tenant. Each
//! one runs inside exactly one transaction — parent lookup, position
//! allocation, derived-column computation, row write, and root
//! `updated_at` bump all happen on the same connection, so a failure at any
//! step rolls back the whole mutation and no derived column ever drifts out
//! of the invariants in the data model.

use std::collections::HashMap;

use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Set, Statement, TransactionTrait,
};

use crate::db::entities::tree_node::{self, Column, Entity as TreeNode};
use crate::domain::{Node, NodeMeta};
use crate::engine::path::{derive_for_child, derive_for_root, rewrite_descendant};
use crate::engine::position::{next_position, BulkPositionAllocator};
use crate::error::{Result, TreeError};

/// §3 invariant #5.
pub const MAX_LABEL_JSON_BYTES: usize = 1_048_576;

/// One entry of a bulk-load batch (§4.4.2).
#[derive(Clone, Debug)]
pub struct BulkEntry {
    pub id: i64,
    pub label: String,
    pub parent_id: Option<i64>,
    pub root_id: Option<i64>,
}

/// 63-bit random ids avoid cross-request coordination (§9); masking the
/// sign bit keeps them positive and within `BIGINT` range.
fn generate_id() -> i64 {
    rand::thread_rng().gen::<i64>() & i64::MAX
}

fn now() -> chrono::DateTime<chrono::FixedOffset> {
    chrono::Utc::now().fixed_offset()
}

fn encode_label(label: &str) -> Result<String> {
    let label_json = serde_json::to_string(label)?;
    if label_json.len() > MAX_LABEL_JSON_BYTES {
        return Err(TreeError::LabelTooLarge);
    }
    Ok(label_json)
}

async fn bump_updated_at<C: ConnectionTrait>(conn: &C, root_id: i64) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "UPDATE tree_nodes SET updated_at = now() WHERE id = $1",
        [root_id.into()],
    ))
    .await
    .map_err(TreeError::from_db_err)?;
    Ok(())
}

async fn find_node<C: ConnectionTrait>(conn: &C, tenant_id: &str, id: i64) -> Result<Option<tree_node::Model>> {
    TreeNode::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::Id.eq(id))
        .one(conn)
        .await
        .map_err(TreeError::from_db_err)
}

/// §4.4.1 Insert one node.
pub async fn insert_node(
    conn: &DatabaseConnection,
    tenant_id: &str,
    label: &str,
    parent_id: Option<i64>,
) -> Result<Node> {
    let label_json = encode_label(label)?;
    let txn = conn.begin().await.map_err(TreeError::from_db_err)?;

    let id = generate_id();
    let pos = next_position(&txn, tenant_id, parent_id).await?;

    let meta = match parent_id {
        None => derive_for_root(id, pos),
        Some(parent_id) => {
            let parent = find_node(&txn, tenant_id, parent_id)
                .await?
                .ok_or(TreeError::ParentNotFound(parent_id))?;
            derive_for_child(&NodeMeta::from_row(&parent), id, pos)?
        }
    };

    let timestamp = now();
    let row = tree_node::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id.to_string()),
        root_id: Set(meta.root_id),
        parent_id: Set(parent_id),
        label: Set(label.to_string()),
        label_json: Set(label_json),
        pos: Set(pos),
        path_ids: Set(meta.path_ids),
        path_pos: Set(meta.path_pos),
        depth: Set(meta.depth),
        created_at: Set(timestamp),
        updated_at: Set(timestamp),
    };
    let inserted = row.insert(&txn).await.map_err(TreeError::from_db_err)?;

    if parent_id.is_some() {
        bump_updated_at(&txn, meta.root_id).await?;
    }

    txn.commit().await.map_err(TreeError::from_db_err)?;
    Ok(inserted)
}

/// §4.4.2 Bulk load. Precondition: parents appear before children and ids
/// are unique; not validated here beyond what naturally fails (a clashing
/// id is a primary-key violation surfaced as `ConflictRetry`/`Internal`).
pub async fn bulk_load(conn: &DatabaseConnection, tenant_id: &str, entries: Vec<BulkEntry>) -> Result<usize> {
    if entries.is_empty() {
        return Ok(0);
    }

    let txn = conn.begin().await.map_err(TreeError::from_db_err)?;
    let mut allocator = BulkPositionAllocator::new();
    let mut metas: HashMap<i64, NodeMeta> = HashMap::new();
    let timestamp = now();
    let mut created = 0usize;

    for entry in &entries {
        let pos = allocator.next(entry.parent_id);
        let label_json = encode_label(&entry.label)?;

        let meta = match entry.parent_id {
            None => derive_for_root(entry.id, pos),
            Some(parent_id) => match metas.get(&parent_id) {
                Some(parent_meta) => derive_for_child(parent_meta, entry.id, pos)?,
                None => {
                    // Best-effort fallback: an entry whose parent hasn't been
                    // seen yet in this batch is treated as a root, per §4.4.2
                    // and the open question in §9. A stricter implementation
                    // would reject the whole batch with `BulkLoadInvalidOrder`
                    // instead; this one keeps the documented fallback.
                    NodeMeta {
                        root_id: entry.root_id.unwrap_or(entry.id),
                        path_ids: vec![entry.id],
                        path_pos: vec![pos],
                        depth: 1,
                    }
                }
            },
        };

        let row = tree_node::ActiveModel {
            id: Set(entry.id),
            tenant_id: Set(tenant_id.to_string()),
            root_id: Set(meta.root_id),
            parent_id: Set(entry.parent_id),
            label: Set(entry.label.clone()),
            label_json: Set(label_json),
            pos: Set(pos),
            path_ids: Set(meta.path_ids.clone()),
            path_pos: Set(meta.path_pos.clone()),
            depth: Set(meta.depth),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        row.insert(&txn).await.map_err(TreeError::from_db_err)?;
        metas.insert(entry.id, meta);
        created += 1;
    }

    txn.commit().await.map_err(TreeError::from_db_err)?;
    Ok(created)
}

struct DescendantRow {
    id: i64,
    path_ids: Vec<i64>,
    path_pos: Vec<i64>,
    depth: i16,
}

async fn fetch_descendants<C: ConnectionTrait>(conn: &C, tenant_id: &str, source_id: i64) -> Result<Vec<DescendantRow>> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, path_ids, path_pos, depth FROM tree_nodes \
             WHERE tenant_id = $1 AND $2 = ANY(path_ids) AND id <> $2",
            [tenant_id.into(), source_id.into()],
        ))
        .await
        .map_err(TreeError::from_db_err)?;

    rows.iter()
        .map(|row| {
            Ok(DescendantRow {
                id: row.try_get("", "id").map_err(TreeError::from_db_err)?,
                path_ids: row.try_get("", "path_ids").map_err(TreeError::from_db_err)?,
                path_pos: row.try_get("", "path_pos").map_err(TreeError::from_db_err)?,
                depth: row.try_get("", "depth").map_err(TreeError::from_db_err)?,
            })
        })
        .collect()
}

/// §4.4.3 Move subtree.
pub async fn move_subtree(
    conn: &DatabaseConnection,
    tenant_id: &str,
    source_id: i64,
    target_id: Option<i64>,
) -> Result<()> {
    let txn = conn.begin().await.map_err(TreeError::from_db_err)?;

    let source = find_node(&txn, tenant_id, source_id)
        .await?
        .ok_or(TreeError::SourceNotFound(source_id))?;

    let target = match target_id {
        None => None,
        Some(target_id) => {
            let target = find_node(&txn, tenant_id, target_id)
                .await?
                .ok_or(TreeError::TargetNotFound(target_id))?;
            if target.path_ids.contains(&source_id) {
                return Err(TreeError::CycleRejected);
            }
            Some(target)
        }
    };

    let pos = next_position(&txn, tenant_id, target_id).await?;
    let new_source_meta = match &target {
        None => derive_for_root(source_id, pos),
        Some(target) => derive_for_child(&NodeMeta::from_row(target), source_id, pos)?,
    };

    // Snapshot descendants before the source row is rewritten below, so the
    // `ANY(path_ids)` match still sees the pre-move paths.
    let descendants = fetch_descendants(&txn, tenant_id, source_id).await?;
    let old_root_id = source.root_id;

    for desc in &descendants {
        let old_meta = NodeMeta {
            root_id: old_root_id,
            path_ids: desc.path_ids.clone(),
            path_pos: desc.path_pos.clone(),
            depth: desc.depth,
        };
        let rewritten = rewrite_descendant(&old_meta, &new_source_meta, source_id)?;

        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE tree_nodes SET root_id = $1, path_ids = $2, path_pos = $3, depth = $4 \
             WHERE tenant_id = $5 AND id = $6",
            [
                rewritten.root_id.into(),
                rewritten.path_ids.into(),
                rewritten.path_pos.into(),
                rewritten.depth.into(),
                tenant_id.into(),
                desc.id.into(),
            ],
        ))
        .await
        .map_err(TreeError::from_db_err)?;
    }

    let mut source_active: tree_node::ActiveModel = source.into();
    source_active.parent_id = Set(target_id);
    source_active.root_id = Set(new_source_meta.root_id);
    source_active.pos = Set(pos);
    source_active.path_ids = Set(new_source_meta.path_ids.clone());
    source_active.path_pos = Set(new_source_meta.path_pos.clone());
    source_active.depth = Set(new_source_meta.depth);
    source_active.update(&txn).await.map_err(TreeError::from_db_err)?;

    if old_root_id != new_source_meta.root_id {
        bump_updated_at(&txn, old_root_id).await?;
    }
    bump_updated_at(&txn, new_source_meta.root_id).await?;

    txn.commit().await.map_err(TreeError::from_db_err)?;
    Ok(())
}

struct SubtreeRow {
    id: i64,
    label: String,
    parent_id: Option<i64>,
    pos: i64,
    path_ids: Vec<i64>,
    path_pos: Vec<i64>,
    depth: i16,
}

/// §4.4.4 Clone subtree. Returns the new id of the clone's root.
pub async fn clone_subtree(
    conn: &DatabaseConnection,
    tenant_id: &str,
    source_id: i64,
    target_id: Option<i64>,
) -> Result<i64> {
    let txn = conn.begin().await.map_err(TreeError::from_db_err)?;

    find_node(&txn, tenant_id, source_id)
        .await?
        .ok_or(TreeError::SourceNotFound(source_id))?;

    let target = match target_id {
        None => None,
        Some(target_id) => Some(
            find_node(&txn, tenant_id, target_id)
                .await?
                .ok_or(TreeError::TargetNotFound(target_id))?,
        ),
    };
    // No cycle check here: cloning into a descendant of the source is legal
    // because the clone is an independent subtree (§4.4.4 step 1).

    let rows = txn
        .query_all(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, label, parent_id, pos, path_ids, path_pos, depth FROM tree_nodes \
             WHERE tenant_id = $1 AND $2 = ANY(path_ids)",
            [tenant_id.into(), source_id.into()],
        ))
        .await
        .map_err(TreeError::from_db_err)?;

    let mut nodes: Vec<SubtreeRow> = Vec::with_capacity(rows.len());
    for row in &rows {
        nodes.push(SubtreeRow {
            id: row.try_get("", "id").map_err(TreeError::from_db_err)?,
            label: row.try_get("", "label").map_err(TreeError::from_db_err)?,
            parent_id: row.try_get("", "parent_id").map_err(TreeError::from_db_err)?,
            pos: row.try_get("", "pos").map_err(TreeError::from_db_err)?,
            path_ids: row.try_get("", "path_ids").map_err(TreeError::from_db_err)?,
            path_pos: row.try_get("", "path_pos").map_err(TreeError::from_db_err)?,
            depth: row.try_get("", "depth").map_err(TreeError::from_db_err)?,
        });
    }

    let mut old_to_new: HashMap<i64, i64> = HashMap::with_capacity(nodes.len());
    for node in &nodes {
        old_to_new.insert(node.id, generate_id());
    }
    let new_source_id = old_to_new[&source_id];

    let pos = next_position(&txn, tenant_id, target_id).await?;
    let anchor = match &target {
        None => derive_for_root(new_source_id, pos),
        Some(target) => derive_for_child(&NodeMeta::from_row(target), new_source_id, pos)?,
    };
    // Path shared by every node in the clone, before the clone's own id.
    let anchor_prefix_ids = &anchor.path_ids[..anchor.path_ids.len() - 1];
    let anchor_prefix_pos = &anchor.path_pos[..anchor.path_pos.len() - 1];

    // Sort by depth so parents are inserted before children (§4.4.4 step 4).
    nodes.sort_by_key(|n| n.depth);

    let timestamp = now();
    for node in &nodes {
        let source_idx = node
            .path_ids
            .iter()
            .position(|&id| id == source_id)
            .ok_or_else(|| TreeError::Internal(format!("source {source_id} missing from subtree row {}", node.id)))?;

        let relative_ids = &node.path_ids[source_idx..];
        let relative_pos = &node.path_pos[source_idx..];

        let mut new_path_ids = anchor_prefix_ids.to_vec();
        let mut new_path_pos = anchor_prefix_pos.to_vec();
        for (i, &old_id) in relative_ids.iter().enumerate() {
            new_path_ids.push(old_to_new[&old_id]);
            // Root of the clone gets the freshly allocated position; interior
            // nodes keep their original position relative to their new parent.
            new_path_pos.push(if i == 0 { pos } else { relative_pos[i] });
        }

        let new_id = old_to_new[&node.id];
        let new_parent_id = if node.id == source_id {
            target_id
        } else {
            node.parent_id.and_then(|p| old_to_new.get(&p).copied())
        };
        let new_pos = if node.id == source_id { pos } else { node.pos };
        let label_json = encode_label(&node.label)?;
        let depth = new_path_ids.len() as i16;

        let row = tree_node::ActiveModel {
            id: Set(new_id),
            tenant_id: Set(tenant_id.to_string()),
            root_id: Set(anchor.root_id),
            parent_id: Set(new_parent_id),
            label: Set(node.label.clone()),
            label_json: Set(label_json),
            pos: Set(new_pos),
            path_ids: Set(new_path_ids),
            path_pos: Set(new_path_pos),
            depth: Set(depth),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };
        row.insert(&txn).await.map_err(TreeError::from_db_err)?;
    }

    if target_id.is_some() {
        bump_updated_at(&txn, anchor.root_id).await?;
    }

    txn.commit().await.map_err(TreeError::from_db_err)?;
    Ok(new_source_id)
}

/// §4.4.5 Delete every row for a tenant. The foreign-key cascade on
/// `parent_id` is a safety net; this statement already matches every row in
/// the tenant regardless of position in the tree.
pub async fn delete_tenant(conn: &DatabaseConnection, tenant_id: &str) -> Result<u64> {
    let result = TreeNode::delete_many()
        .filter(Column::TenantId.eq(tenant_id))
        .exec(conn)
        .await
        .map_err(TreeError::from_db_err)?;
    Ok(result.rows_affected)
}
