use sea_orm::DatabaseConnection;
use tree_core::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub config: AppConfig,
}
