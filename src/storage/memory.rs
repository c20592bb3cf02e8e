//! 内存表存储
//!
//! 进程退出即丢失，用于演示模式与服务层测试。

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{Filter, Record, TableStore, record_has_id};
use crate::errors::Result;

#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: DashMap<String, Vec<Record>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map(|rows| rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<()> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .extend(records);
        Ok(())
    }

    async fn read(&self, table: &str, filter: &Filter) -> Result<Vec<Record>> {
        Ok(self
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update(
        &self,
        table: &str,
        id_column: &str,
        id_value: &Value,
        updates: Record,
    ) -> Result<()> {
        if let Some(mut rows) = self.tables.get_mut(table) {
            for row in rows
                .iter_mut()
                .filter(|r| record_has_id(r, id_column, id_value))
            {
                for (key, value) in &updates {
                    row.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id_column: &str, id_value: &Value) -> Result<()> {
        if let Some(mut rows) = self.tables.get_mut(table) {
            rows.retain(|r| !record_has_id(r, id_column, id_value));
        }
        Ok(())
    }
}
