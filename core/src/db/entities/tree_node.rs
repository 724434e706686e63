//! `tree_nodes` entity — one row per node, across every tenant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tree_nodes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub tenant_id: String,
    pub root_id: i64,
    pub parent_id: Option<i64>,
    pub label: String,
    pub label_json: String,
    pub pos: i64,
    #[sea_orm(column_type = "Array(Box::new(ColumnType::BigInteger))")]
    pub path_ids: Vec<i64>,
    #[sea_orm(column_type = "Array(Box::new(ColumnType::BigInteger))")]
    pub path_pos: Vec<i64>,
    pub depth: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Parent,
}

impl Related<Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
