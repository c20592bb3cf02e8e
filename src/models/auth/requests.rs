use serde::Deserialize;
use ts_rs::TS;

// 用户登录请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// 用户注册请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    /// 缺省时取邮箱 @ 之前的部分
    #[serde(default)]
    pub name: Option<String>,
}
