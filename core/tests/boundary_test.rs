//! Boundary cases from the testable-properties section: empty and
//! single-node tenants, the depth ceiling, and the round-trip property for
//! a freshly bulk-loaded forest.
//!
//! `tree_nodes.id` is one global primary key shared by every tenant, so the
//! depth-chain tests offset their local ids by a random `common::id_base()`
//! to stay out of other concurrently-run tests' primary-key space.

mod common;

use tree_core::engine::mutate::BulkEntry;
use tree_core::engine::path::MAX_DEPTH;
use tree_core::{TreeError, TreeService};

fn default_config() -> tree_core::config::AppConfig {
    tree_core::config::AppConfig::new("unused".to_string(), "development".to_string())
}

#[tokio::test]
async fn empty_tenant_renders_empty_array() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("empty");
    let service = TreeService::new(db.connection(), Some(&tenant));
    assert_eq!(service.forest_json().await.unwrap(), "[]");
}

#[tokio::test]
async fn single_node_tenant() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("single-node");
    let service = TreeService::new(db.connection(), Some(&tenant));

    let node = service.insert("only", None).await.unwrap();

    let forest = service.forest_json().await.unwrap();
    let expected = format!(r#"[{{"id":"{}","label":"only","children":[]}}]"#, node.id);
    assert_eq!(forest, expected);
}

#[tokio::test]
async fn repeated_get_is_byte_identical_without_mutation() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("repeated-get");
    let service = TreeService::new(db.connection(), Some(&tenant));

    service.insert("a", None).await.unwrap();
    let first = service.forest_json().await.unwrap();
    let second = service.forest_json().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn depth_at_the_ceiling_loads_successfully() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("depth-ceiling");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    let chain: Vec<BulkEntry> = (1..=MAX_DEPTH as i64)
        .map(|n| BulkEntry {
            id: base + n,
            label: format!("n{n}"),
            parent_id: if n == 1 { None } else { Some(base + n - 1) },
            root_id: None,
        })
        .collect();

    service.bulk_load(&default_config(), chain).await.unwrap();
}

#[tokio::test]
async fn depth_past_the_ceiling_is_rejected() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("depth-over");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    let mut chain: Vec<BulkEntry> = (1..=MAX_DEPTH as i64)
        .map(|n| BulkEntry {
            id: base + n,
            label: format!("n{n}"),
            parent_id: if n == 1 { None } else { Some(base + n - 1) },
            root_id: None,
        })
        .collect();
    chain.push(BulkEntry {
        id: base + MAX_DEPTH as i64 + 1,
        label: "too-deep".to_string(),
        parent_id: Some(base + MAX_DEPTH as i64),
        root_id: None,
    });

    let err = service.bulk_load(&default_config(), chain).await.unwrap_err();
    assert!(matches!(err, TreeError::DepthExceeded(_)));
}

#[tokio::test]
async fn bulk_load_is_gated_in_production() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("prod-gate");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));
    let production = tree_core::config::AppConfig::new("unused".to_string(), "production".to_string());

    let err = service
        .bulk_load(
            &production,
            vec![BulkEntry { id: base + 1, label: "x".to_string(), parent_id: None, root_id: None }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TreeError::ForbiddenInProduction));

    let err = service.delete_all(&production).await.unwrap_err();
    assert!(matches!(err, TreeError::ForbiddenInProduction));
}

#[tokio::test]
async fn blank_label_is_rejected() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("blank-label");
    let service = TreeService::new(db.connection(), Some(&tenant));

    let err = service.insert("", None).await.unwrap_err();
    assert!(matches!(err, TreeError::InvalidRequest(_)));
}
