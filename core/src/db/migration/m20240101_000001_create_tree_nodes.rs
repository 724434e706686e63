//! Initial schema: the `tree_nodes` table and its indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TreeNodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TreeNodes::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(TreeNodes::TenantId).string().not_null())
                    .col(ColumnDef::new(TreeNodes::RootId).big_integer().not_null())
                    .col(ColumnDef::new(TreeNodes::ParentId).big_integer().null())
                    .col(ColumnDef::new(TreeNodes::Label).text().not_null())
                    .col(ColumnDef::new(TreeNodes::LabelJson).text().not_null())
                    .col(ColumnDef::new(TreeNodes::Pos).big_integer().not_null())
                    .col(
                        ColumnDef::new(TreeNodes::PathIds)
                            .array(ColumnType::BigInteger)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TreeNodes::PathPos)
                            .array(ColumnType::BigInteger)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TreeNodes::Depth).small_integer().not_null())
                    .col(
                        ColumnDef::new(TreeNodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TreeNodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tree_nodes_parent_id")
                            .from(TreeNodes::Table, TreeNodes::ParentId)
                            .to(TreeNodes::Table, TreeNodes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // CHECK constraints: sea-query's fluent builder doesn't express a
        // cross-row-agnostic named CHECK, so these go through raw SQL, same
        // as the original's reach for `op.execute` where the fluent schema
        // builder ran out of road.
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE tree_nodes ADD CONSTRAINT ck_tree_nodes_depth \
                 CHECK (depth BETWEEN 1 AND 32767)",
            )
            .await?;
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE tree_nodes ADD CONSTRAINT ck_tree_nodes_label_json \
                 CHECK (label_json <> '')",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_tree_nodes_root_path_pos")
                    .table(TreeNodes::Table)
                    .col(TreeNodes::RootId)
                    .col(TreeNodes::PathPos)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_tree_nodes_parent_pos")
                    .table(TreeNodes::Table)
                    .col(TreeNodes::ParentId)
                    .col(TreeNodes::Pos)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_tree_nodes_root_updated")
                    .table(TreeNodes::Table)
                    .col(TreeNodes::RootId)
                    .col(TreeNodes::UpdatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_tree_nodes_tenant_root")
                    .table(TreeNodes::Table)
                    .col(TreeNodes::TenantId)
                    .col(TreeNodes::RootId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TreeNodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TreeNodes {
    Table,
    Id,
    TenantId,
    RootId,
    ParentId,
    Label,
    LabelJson,
    Pos,
    PathIds,
    PathPos,
    Depth,
    CreatedAt,
    UpdatedAt,
}
