use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::storage::TableRow;

/// `users` 表中的本地账号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TableRow for UserRecord {
    const TABLE: &'static str = "users";
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// 对外暴露的用户信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct User {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
