//! Peer Eval - 课程小组同伴互评后端服务
//!
//! 基于 Actix Web 构建，数据保存在通用的表存储之上。
//!
//! # 架构
//! - `cache`: 缓存层（Moka/Redis），仅用于认证
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体（本地表存储）
//! - `errors`: 统一错误处理
//! - `middlewares`: JWT 认证中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `state`: 应用共享状态
//! - `storage`: 表存储（远程 API / SeaORM / 内存）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;
