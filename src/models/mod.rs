//! 数据模型定义
//!
//! 表记录（`entities`）、HTTP 请求体（`requests`）与响应体（`responses`）。

pub mod activities;
pub mod auth;
pub mod categories;
pub mod common;
pub mod courses;
pub mod evaluations;
pub mod results;
pub mod system;

pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 响应中的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    RemoteServiceError = 1006,
    Conflict = 1009,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserAlreadyExists = 2002,

    // 课程与分组
    LimitReached = 3000,
    GroupFull = 3001,

    // 评估
    InvalidScore = 4000,
    SelfEvaluation = 4001,
}
