//! SeaORM 实体定义
//!
//! 只用于 local 后端，与 models 模块中的业务实体分离。

pub mod table_records;
