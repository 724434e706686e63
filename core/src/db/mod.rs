//! Database infrastructure: connection pooling and migrations.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

pub mod entities;
pub mod migration;

/// A pooled connection to the tree store, with migrations applied.
pub struct Database {
    conn: DatabaseConnection,
}

impl Database {
    /// Connect and run any pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(database_url);
        opt.max_connections(10)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(60))
            .sqlx_logging(false); // we use tracing instead

        let conn = SeaDatabase::connect(opt).await?;
        migration::Migrator::up(&conn, None).await?;
        info!("connected and migrated tree store");

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
