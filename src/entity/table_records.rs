//! 表记录实体
//!
//! local 后端把每张逻辑表的记录以 JSON 文本存放在同一张物理表中。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "table_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub table_name: String,
    /// 记录中的 `id` 字段，便于按主键查询
    #[sea_orm(nullable)]
    pub record_id: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub record: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
