//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 错误仍以消息区分语义（"already exists"、"does not exist" 等），
//! 变体只决定错误代码与 HTTP 状态映射。

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_peer_eval_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum PeerEvalError {
            $($variant(String),)*
        }

        impl PeerEvalError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(PeerEvalError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(PeerEvalError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(PeerEvalError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl PeerEvalError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        PeerEvalError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_peer_eval_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CacheBackendNotFound("E002", "Cache Backend Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    RemoteApi("E006", "Remote Table API Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    StorageBackendNotFound("E010", "Storage Backend Not Found"),
    AlreadyExists("E011", "Resource Already Exists"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    InvalidScore("E014", "Invalid Score Range"),
    SelfEvaluation("E015", "Self Evaluation Not Allowed"),
    GroupFull("E016", "Group Capacity Reached"),
    LimitReached("E017", "Limit Reached"),
}

impl PeerEvalError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为调用方可修正的错误（4xx 类）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PeerEvalError::Validation(_)
                | PeerEvalError::NotFound(_)
                | PeerEvalError::AlreadyExists(_)
                | PeerEvalError::Authentication(_)
                | PeerEvalError::Authorization(_)
                | PeerEvalError::InvalidScore(_)
                | PeerEvalError::SelfEvaluation(_)
                | PeerEvalError::GroupFull(_)
                | PeerEvalError::LimitReached(_)
        )
    }
}

impl fmt::Display for PeerEvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PeerEvalError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for PeerEvalError {
    fn from(err: sea_orm::DbErr) -> Self {
        PeerEvalError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PeerEvalError {
    fn from(err: serde_json::Error) -> Self {
        PeerEvalError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for PeerEvalError {
    fn from(err: reqwest::Error) -> Self {
        PeerEvalError::RemoteApi(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PeerEvalError>;

impl PeerEvalError {
    /// 对应的 HTTP 状态码与响应错误码
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            PeerEvalError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
            PeerEvalError::InvalidScore(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidScore),
            PeerEvalError::SelfEvaluation(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::SelfEvaluation)
            }
            PeerEvalError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            PeerEvalError::AlreadyExists(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            PeerEvalError::GroupFull(_) => (StatusCode::CONFLICT, ErrorCode::GroupFull),
            PeerEvalError::LimitReached(_) => (StatusCode::CONFLICT, ErrorCode::LimitReached),
            PeerEvalError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::AuthFailed),
            PeerEvalError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            PeerEvalError::RemoteApi(_) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::RemoteServiceError)
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
            ),
        }
    }
}

// 处理函数可以直接用 `?` 返回业务错误
impl ResponseError for PeerEvalError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("{}", self.format_simple());
        }
        HttpResponse::build(status).json(ApiResponse::error_empty(code, self.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PeerEvalError::cache_connection("test").code(), "E001");
        assert_eq!(PeerEvalError::remote_api("test").code(), "E006");
        assert_eq!(PeerEvalError::validation("test").code(), "E007");
        assert_eq!(PeerEvalError::self_evaluation("test").code(), "E015");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            PeerEvalError::invalid_score("test").error_type(),
            "Invalid Score Range"
        );
        assert_eq!(
            PeerEvalError::already_exists("test").error_type(),
            "Resource Already Exists"
        );
    }

    #[test]
    fn test_error_message() {
        let err = PeerEvalError::not_found("Assessment does not exist");
        assert_eq!(err.message(), "Assessment does not exist");
    }

    #[test]
    fn test_format_simple() {
        let err = PeerEvalError::group_full("Group 2 is full");
        let formatted = err.format_simple();
        assert!(formatted.contains("Group Capacity Reached"));
        assert!(formatted.contains("Group 2 is full"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(PeerEvalError::invalid_score("x").is_client_error());
        assert!(PeerEvalError::limit_reached("x").is_client_error());
        assert!(!PeerEvalError::remote_api("x").is_client_error());
        assert!(!PeerEvalError::database_operation("x").is_client_error());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            PeerEvalError::already_exists("x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PeerEvalError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PeerEvalError::invalid_score("x").status_and_code().1,
            ErrorCode::InvalidScore
        );
        assert_eq!(
            PeerEvalError::remote_api("x").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PeerEvalError::serialization("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
