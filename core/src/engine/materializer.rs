//! Forest materializer: one window-function query that turns a tenant's
//! rows into the nested JSON forest document, in a single database
//! round-trip with no recursion and no application-side assembly.
//!
//! Postgres gives array columns a default btree opclass, so `ORDER BY
//! path_pos` is exactly the lexicographic comparison spec invariant #4
//! relies on: parents sort immediately before their first child, and
//! siblings sort by `pos`. Root order (`updated_at` desc, then `id`) is
//! carried through every CTE explicitly and applied in the final
//! `STRING_AGG` — a `CTE`'s own internal `ORDER BY` does not propagate to
//! an outer query.

use sea_orm::{ConnectionTrait, DbBackend, Statement};

use crate::error::Result;

const FOREST_JSON_QUERY: &str = r#"
WITH roots AS (
    SELECT id AS root_id, updated_at
    FROM tree_nodes
    WHERE parent_id IS NULL AND tenant_id = $1
),
nodes AS (
    SELECT n.id, n.label_json, n.root_id, n.path_pos, n.depth
    FROM tree_nodes n
    WHERE n.tenant_id = $1
),
ordered AS (
    SELECT
        id, label_json, root_id, path_pos, depth,
        LEAD(depth, 1, 0) OVER (PARTITION BY root_id ORDER BY path_pos) AS next_depth,
        LAG(depth) OVER (PARTITION BY root_id ORDER BY path_pos) AS prev_depth,
        ROW_NUMBER() OVER (PARTITION BY root_id ORDER BY path_pos) AS row_num
    FROM nodes
),
per_root AS (
    SELECT
        o.root_id,
        STRING_AGG(
            CASE
                WHEN row_num = 1 THEN ''
                WHEN depth > prev_depth THEN ''
                ELSE ','
            END ||
            '{"id":"' || id::text || '"' ||
            ',"label":' || label_json ||
            ',"children":[' ||
            CASE
                WHEN next_depth > depth THEN ''
                WHEN next_depth = 0 THEN REPEAT(']}', depth::int)
                WHEN next_depth < depth THEN REPEAT(']}', (depth - next_depth)::int) || ']}'
                ELSE ']}'
            END,
            '' ORDER BY path_pos
        ) AS json_text
    FROM ordered o
    GROUP BY o.root_id
)
SELECT
    COALESCE(
        '[' || STRING_AGG(pr.json_text, ',' ORDER BY r.updated_at DESC, r.root_id) || ']',
        '[]'
    ) AS forest_json
FROM roots r
LEFT JOIN per_root pr USING (root_id)
"#;

/// Render the entire forest for `tenant_id` as a JSON array string, ids
/// emitted as JSON strings to preserve 64-bit precision across consumers.
pub async fn materialize_forest<C: ConnectionTrait>(conn: &C, tenant_id: &str) -> Result<String> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            FOREST_JSON_QUERY,
            [tenant_id.into()],
        ))
        .await?;

    let json = match row {
        Some(row) => row.try_get::<Option<String>>("", "forest_json")?,
        None => None,
    };

    Ok(json.unwrap_or_else(|| "[]".to_string()))
}
