use super::SeaOrmTableStore;
use crate::entity::table_records::{ActiveModel, Column, Entity as TableRecords, Model};
use crate::errors::{PeerEvalError, Result};
use crate::storage::{Filter, Record, TableStore, record_has_id};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;

/// 记录主键的文本形式，用于 `record_id` 列
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_record(model: &Model) -> Result<Record> {
    match serde_json::from_str::<Value>(&model.record)? {
        Value::Object(map) => Ok(map),
        _ => Err(PeerEvalError::serialization(format!(
            "表 {} 中的记录 {} 不是 JSON 对象",
            model.table_name, model.id
        ))),
    }
}

impl SeaOrmTableStore {
    /// 取出一张逻辑表的行，可按主键预筛
    async fn load_models(&self, table: &str, record_id: Option<String>) -> Result<Vec<Model>> {
        let mut query = TableRecords::find().filter(Column::TableName.eq(table));
        if let Some(record_id) = record_id {
            query = query.filter(Column::RecordId.eq(record_id));
        }

        query
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PeerEvalError::database_operation(format!("查询表 {table} 失败: {e}")))
    }

    /// 取出 id_column == id_value 的行及其解析后的记录
    async fn matching_models(
        &self,
        table: &str,
        id_column: &str,
        id_value: &Value,
    ) -> Result<Vec<(Model, Record)>> {
        let prefilter = if id_column == "id" {
            id_text(id_value)
        } else {
            None
        };

        let mut matched = Vec::new();
        for model in self.load_models(table, prefilter).await? {
            let record = parse_record(&model)?;
            if record_has_id(&record, id_column, id_value) {
                matched.push((model, record));
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl TableStore for SeaOrmTableStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        for record in records {
            let model = ActiveModel {
                table_name: Set(table.to_string()),
                record_id: Set(record.get("id").and_then(id_text)),
                record: Set(serde_json::to_string(&record)?),
                created_at: Set(now),
                ..Default::default()
            };

            model
                .insert(&self.db)
                .await
                .map_err(|e| PeerEvalError::database_operation(format!("插入 {table} 失败: {e}")))?;
        }
        Ok(())
    }

    async fn read(&self, table: &str, filter: &Filter) -> Result<Vec<Record>> {
        let prefilter = filter.get("id").and_then(id_text);

        let mut records = Vec::new();
        for model in self.load_models(table, prefilter).await? {
            let record = parse_record(&model)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn update(
        &self,
        table: &str,
        id_column: &str,
        id_value: &Value,
        updates: Record,
    ) -> Result<()> {
        for (model, mut record) in self.matching_models(table, id_column, id_value).await? {
            for (key, value) in &updates {
                record.insert(key.clone(), value.clone());
            }

            let mut active: ActiveModel = model.into();
            active.record_id = Set(record.get("id").and_then(id_text));
            active.record = Set(serde_json::to_string(&record)?);
            active
                .update(&self.db)
                .await
                .map_err(|e| PeerEvalError::database_operation(format!("更新 {table} 失败: {e}")))?;
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id_column: &str, id_value: &Value) -> Result<()> {
        let ids: Vec<i64> = self
            .matching_models(table, id_column, id_value)
            .await?
            .into_iter()
            .map(|(model, _)| model.id)
            .collect();

        if ids.is_empty() {
            return Ok(());
        }

        TableRecords::delete_many()
            .filter(Column::Id.is_in(ids))
            .exec(&self.db)
            .await
            .map_err(|e| PeerEvalError::database_operation(format!("删除 {table} 失败: {e}")))?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| PeerEvalError::database_connection(format!("数据库不可用: {e}")))
    }

    async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| PeerEvalError::database_connection(format!("关闭数据库失败: {e}")))
    }
}
