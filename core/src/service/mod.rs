//! Service facade: binds a tenant id to each operation, validates inputs,
//! and otherwise delegates straight to the engine. This is the seam the
//! HTTP layer calls through.

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::domain::Node;
use crate::engine::{materializer, mutate};
use crate::error::{Result, TreeError};

pub const DEFAULT_TENANT: &str = "default";

/// A tree-store operation scoped to one tenant.
pub struct TreeService<'a> {
    conn: &'a DatabaseConnection,
    tenant_id: String,
}

impl<'a> TreeService<'a> {
    pub fn new(conn: &'a DatabaseConnection, tenant_id: Option<&str>) -> Self {
        let tenant_id = match tenant_id {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_TENANT.to_string(),
        };
        Self { conn, tenant_id }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// `GET /api/tree` — the whole forest as a JSON array string.
    pub async fn forest_json(&self) -> Result<String> {
        materializer::materialize_forest(self.conn, &self.tenant_id).await
    }

    /// `POST /api/tree`
    pub async fn insert(&self, label: &str, parent_id: Option<i64>) -> Result<Node> {
        if label.is_empty() {
            return Err(TreeError::InvalidRequest("label must not be empty".to_string()));
        }
        mutate::insert_node(self.conn, &self.tenant_id, label, parent_id).await
    }

    /// `POST /api/tree/move`
    pub async fn move_subtree(&self, source_id: i64, target_id: Option<i64>) -> Result<()> {
        mutate::move_subtree(self.conn, &self.tenant_id, source_id, target_id).await
    }

    /// `POST /api/tree/clone`
    pub async fn clone_subtree(&self, source_id: i64, target_id: Option<i64>) -> Result<i64> {
        mutate::clone_subtree(self.conn, &self.tenant_id, source_id, target_id).await
    }

    /// `POST /api/tree/bulk` — gated by `config.is_production()`.
    pub async fn bulk_load(&self, config: &AppConfig, entries: Vec<mutate::BulkEntry>) -> Result<usize> {
        if config.is_production() {
            return Err(TreeError::ForbiddenInProduction);
        }
        mutate::bulk_load(self.conn, &self.tenant_id, entries).await
    }

    /// `DELETE /api/tree` — gated by `config.is_production()`.
    pub async fn delete_all(&self, config: &AppConfig) -> Result<u64> {
        if config.is_production() {
            return Err(TreeError::ForbiddenInProduction);
        }
        mutate::delete_tenant(self.conn, &self.tenant_id).await
    }
}
