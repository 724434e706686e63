//! The seed scenarios from the testable-properties section: bulk-load
//! shapes, move, clone, cycle rejection, and tenant isolation, each
//! exercised through `TreeService` against a real Postgres instance.
//!
//! `tree_nodes.id` is one global primary key shared by every tenant, so
//! each test offsets its handful of readable local ids (1, 2, 3, ...) by a
//! random `base` from `common::id_base()` before writing them. Without
//! that offset, concurrently-run tests reusing small literal ids would
//! collide on the primary key even though they live in different tenants.

mod common;

use serde_json::Value;
use tree_core::engine::mutate::BulkEntry;
use tree_core::{TreeError, TreeService};

fn entry(base: i64, id: i64, label: &str, parent_id: Option<i64>) -> BulkEntry {
    BulkEntry {
        id: base + id,
        label: label.to_string(),
        parent_id: parent_id.map(|p| base + p),
        root_id: None,
    }
}

#[tokio::test]
async fn simple_forest() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("simple-forest");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    service
        .bulk_load(
            &default_config(),
            vec![
                entry(base, 1, "A", None),
                entry(base, 2, "B", Some(1)),
                entry(base, 3, "C", Some(1)),
                entry(base, 4, "D", Some(3)),
            ],
        )
        .await
        .unwrap();

    let forest: Value = serde_json::from_str(&service.forest_json().await.unwrap()).unwrap();
    let expected: Value = serde_json::from_str(&format!(
        r#"[{{"id":"{a}","label":"A","children":[
            {{"id":"{b}","label":"B","children":[]}},
            {{"id":"{c}","label":"C","children":[{{"id":"{d}","label":"D","children":[]}}]}}
        ]}}]"#,
        a = base + 1,
        b = base + 2,
        c = base + 3,
        d = base + 4,
    ))
    .unwrap();
    assert_eq!(forest, expected);
}

#[tokio::test]
async fn deep_chain_of_five() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("deep-chain");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    service
        .bulk_load(
            &default_config(),
            vec![
                entry(base, 1, "L1", None),
                entry(base, 2, "L2", Some(1)),
                entry(base, 3, "L3", Some(2)),
                entry(base, 4, "L4", Some(3)),
                entry(base, 5, "L5", Some(4)),
            ],
        )
        .await
        .unwrap();

    let forest: Value = serde_json::from_str(&service.forest_json().await.unwrap()).unwrap();
    let mut node = &forest[0];
    for depth in 1..=5 {
        assert_eq!(node["label"], format!("L{depth}"));
        let children = node["children"].as_array().unwrap();
        if depth < 5 {
            assert_eq!(children.len(), 1);
            node = &node["children"][0];
        } else {
            assert!(children.is_empty());
        }
    }
}

#[tokio::test]
async fn move_with_descendants() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("move-descendants");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    service
        .bulk_load(
            &default_config(),
            vec![
                entry(base, 1, "root", None),
                entry(base, 2, "a", Some(1)),
                entry(base, 3, "a1", Some(2)),
                entry(base, 4, "a2", Some(2)),
                entry(base, 5, "b", Some(1)),
            ],
        )
        .await
        .unwrap();

    service.move_subtree(base + 2, Some(base + 5)).await.unwrap();

    let forest: Value = serde_json::from_str(&service.forest_json().await.unwrap()).unwrap();
    let b = &forest[0]["children"][0];
    assert_eq!(b["id"], (base + 5).to_string());
    let moved = &b["children"][0];
    assert_eq!(moved["id"], (base + 2).to_string());
    let grandchildren: Vec<&str> = moved["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(grandchildren, vec![(base + 3).to_string(), (base + 4).to_string()]);
}

#[tokio::test]
async fn move_to_root() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("move-to-root");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    service
        .bulk_load(
            &default_config(),
            vec![
                entry(base, 1, "root", None),
                entry(base, 2, "a", Some(1)),
                entry(base, 3, "a1", Some(2)),
                entry(base, 4, "a2", Some(2)),
                entry(base, 5, "b", Some(1)),
            ],
        )
        .await
        .unwrap();

    service.move_subtree(base + 2, None).await.unwrap();

    let forest: Value = serde_json::from_str(&service.forest_json().await.unwrap()).unwrap();
    assert_eq!(forest.as_array().unwrap().len(), 2);
    let new_root = forest
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == (base + 2).to_string())
        .unwrap();
    let descendant_ids: Vec<&str> = new_root["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(descendant_ids, vec![(base + 3).to_string(), (base + 4).to_string()]);
}

#[tokio::test]
async fn clone_preserves_structure_and_changes_ids() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("clone-structure");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    service
        .bulk_load(
            &default_config(),
            vec![
                entry(base, 1, "root", None),
                entry(base, 2, "a", Some(1)),
                entry(base, 3, "a1", Some(2)),
                entry(base, 4, "a2", Some(2)),
                entry(base, 40, "a2a", Some(4)),
                entry(base, 5, "b", Some(1)),
            ],
        )
        .await
        .unwrap();

    let new_id = service.clone_subtree(base + 2, Some(base + 5)).await.unwrap();
    assert_ne!(new_id, base + 2);

    let forest: Value = serde_json::from_str(&service.forest_json().await.unwrap()).unwrap();
    let root_children = forest[0]["children"].as_array().unwrap();
    // Original subtree under root is untouched.
    let original_a = root_children
        .iter()
        .find(|n| n["id"] == (base + 2).to_string())
        .unwrap();
    assert_eq!(original_a["children"].as_array().unwrap().len(), 2);

    // Clone lives under "b" with the same shape and labels but a fresh id.
    let b = root_children
        .iter()
        .find(|n| n["id"] == (base + 5).to_string())
        .unwrap();
    let cloned = &b["children"][0];
    assert_eq!(cloned["id"], new_id.to_string());
    assert_eq!(cloned["label"], "a");
    let cloned_children = cloned["children"].as_array().unwrap();
    assert_eq!(cloned_children.len(), 2);
    let cloned_a2 = cloned_children.iter().find(|n| n["label"] == "a2").unwrap();
    assert_eq!(cloned_a2["children"].as_array().unwrap().len(), 1);
    assert_ne!(cloned_a2["id"], (base + 4).to_string());
}

#[tokio::test]
async fn cycle_rejection() {
    let Some(db) = common::test_db().await else { return };
    let tenant = common::unique_tenant("cycle-rejection");
    let base = common::id_base();
    let service = TreeService::new(db.connection(), Some(&tenant));

    service
        .bulk_load(
            &default_config(),
            vec![
                entry(base, 1, "root", None),
                entry(base, 2, "a", Some(1)),
                entry(base, 3, "a1", Some(2)),
                entry(base, 4, "a2", Some(2)),
            ],
        )
        .await
        .unwrap();

    let before = service.forest_json().await.unwrap();
    let err = service.move_subtree(base + 2, Some(base + 4)).await.unwrap_err();
    assert!(matches!(err, TreeError::CycleRejected));

    let after = service.forest_json().await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn tenant_isolation() {
    let Some(db) = common::test_db().await else { return };
    let org1 = common::unique_tenant("org1");
    let org2 = common::unique_tenant("org2");

    let service1 = TreeService::new(db.connection(), Some(&org1));
    let service2 = TreeService::new(db.connection(), Some(&org2));

    service1.insert("root", None).await.unwrap();

    assert_eq!(service2.forest_json().await.unwrap(), "[]");

    service1.delete_all(&default_config()).await.unwrap();
    assert_eq!(service1.forest_json().await.unwrap(), "[]");
    assert_eq!(service2.forest_json().await.unwrap(), "[]");
}

fn default_config() -> tree_core::config::AppConfig {
    tree_core::config::AppConfig::new("unused".to_string(), "development".to_string())
}
