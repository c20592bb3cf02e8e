//! 表存储层
//!
//! 所有业务数据都通过四个原语访问命名表：`insert`、`read`、`update`、`delete`。
//! 记录是 JSON 对象，过滤条件是顶层字段的等值匹配。
//!
//! 后端：
//! - `remote`: 远程表 REST API（Bearer token 认证）
//! - `local`: SeaORM 本地回退（SQLite / PostgreSQL / MySQL）
//! - `memory`: 进程内存储（演示模式与测试）

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::{PeerEvalError, Result};

pub mod memory;
pub mod remote;
pub mod sea_orm_storage;

/// 一条表记录
pub type Record = serde_json::Map<String, Value>;

#[async_trait]
pub trait TableStore: Send + Sync {
    /// 后端名称，用于日志
    fn backend_name(&self) -> &'static str;

    // 向表中插入记录
    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<()>;
    // 读取满足过滤条件的记录
    async fn read(&self, table: &str, filter: &Filter) -> Result<Vec<Record>>;
    // 将 updates 合并到所有 id_column == id_value 的记录
    async fn update(
        &self,
        table: &str,
        id_column: &str,
        id_value: &Value,
        updates: Record,
    ) -> Result<()>;
    // 删除所有 id_column == id_value 的记录
    async fn delete(&self, table: &str, id_column: &str, id_value: &Value) -> Result<()>;

    /// 后端可用性检查
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// 关闭前释放后端资源（远程会话等）
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// 等值过滤条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Record);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// 记录是否满足所有条件
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(column, expected)| {
            record
                .get(column)
                .is_some_and(|actual| values_match(expected, actual))
        })
    }
}

impl From<Record> for Filter {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

/// 比较过滤值与字段值
///
/// 数字按数值比较；字符串与数字/布尔按文本比较（远程 API 以查询字符串传输过滤条件）。
pub fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .zip(n.as_f64())
            .is_some_and(|(a, b)| a == b),
        (Value::String(s), Value::Bool(b)) | (Value::Bool(b), Value::String(s)) => {
            s.as_str() == if *b { "true" } else { "false" }
        }
        _ => expected == actual,
    }
}

/// 记录中 id_column 是否等于 id_value
pub fn record_has_id(record: &Record, id_column: &str, id_value: &Value) -> bool {
    record
        .get(id_column)
        .is_some_and(|actual| values_match(id_value, actual))
}

/// 强类型表记录
pub trait TableRow: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
}

pub fn to_record<T: Serialize>(row: &T) -> Result<Record> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        other => Err(PeerEvalError::serialization(format!(
            "Expected a JSON object record, got {other}"
        ))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// 强类型辅助方法，任何 TableStore 自动获得
#[async_trait]
pub trait TableStoreExt: TableStore {
    async fn insert_rows<T: TableRow>(&self, rows: &[T]) -> Result<()> {
        let records = rows.iter().map(to_record).collect::<Result<Vec<_>>>()?;
        self.insert(T::TABLE, records).await
    }

    async fn insert_row<T: TableRow>(&self, row: &T) -> Result<()> {
        self.insert(T::TABLE, vec![to_record(row)?]).await
    }

    async fn read_rows<T: TableRow>(&self, filter: &Filter) -> Result<Vec<T>> {
        let records = self.read(T::TABLE, filter).await?;
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            match from_record::<T>(record) {
                Ok(row) => rows.push(row),
                // 远程表是共享的，跳过不符合结构的脏数据
                Err(e) => warn!("Skipping malformed {} record: {}", T::TABLE, e),
            }
        }
        Ok(rows)
    }

    async fn find_row<T: TableRow>(&self, filter: &Filter) -> Result<Option<T>> {
        Ok(self.read_rows::<T>(filter).await?.into_iter().next())
    }

    async fn row_exists<T: TableRow>(&self, filter: &Filter) -> Result<bool> {
        Ok(!self.read(T::TABLE, filter).await?.is_empty())
    }

    async fn delete_rows<T: TableRow>(&self, id_column: &str, id_value: Value) -> Result<()> {
        self.delete(T::TABLE, id_column, &id_value).await
    }
}

impl<S: TableStore + ?Sized> TableStoreExt for S {}

/// 根据配置创建表存储后端
pub async fn create_table_store(config: &AppConfig) -> Result<Arc<dyn TableStore>> {
    match config.storage.backend.as_str() {
        "remote" => {
            let store = remote::RemoteTableStore::connect(&config.remote).await?;
            Ok(Arc::new(store))
        }
        "local" => {
            let store = sea_orm_storage::SeaOrmTableStore::connect(&config.database).await?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(memory::MemoryTableStore::new())),
        other => Err(PeerEvalError::storage_backend_not_found(format!(
            "Unknown storage backend '{other}'. Supported: remote, local, memory"
        ))),
    }
}
