//! 远程表存储
//!
//! 通过远程表 REST API 读写记录，所有请求携带 Bearer token。
//! 收到 401 时刷新一次 token（失败则重新登录）并重放一次请求。

mod auth;

pub use auth::{RemoteAuthClient, RemoteSession};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::{Filter, Record, TableStore};
use crate::config::RemoteConfig;
use crate::errors::{PeerEvalError, Result};
use auth::remote_error;

pub struct RemoteTableStore {
    client: Client,
    database_url: String,
    auth: RemoteAuthClient,
}

/// 过滤值的查询字符串形式
fn query_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl RemoteTableStore {
    /// 创建客户端并用服务账号登录
    pub async fn connect(config: &RemoteConfig) -> Result<Self> {
        if config.project_id.is_empty() {
            return Err(PeerEvalError::database_config(
                "remote.project_id is required for the remote backend",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        let store = Self {
            database_url: format!(
                "{}/database/{}",
                config.base_url.trim_end_matches('/'),
                config.project_id
            ),
            auth: RemoteAuthClient::new(client.clone(), config),
            client,
        };

        store.auth.login().await?;
        info!("Remote table store ready: {}", store.database_url);
        Ok(store)
    }

    /// 发送请求；401 时续期 token 后重放一次
    async fn send<F>(&self, action: &str, build: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder + Send + Sync,
    {
        let token = self.auth.access_token().await?;
        let resp = build(&token).send().await?;

        let resp = if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("Remote {} returned 401, renewing session", action);
            self.auth.renew().await?;
            let token = self.auth.access_token().await?;
            build(&token).send().await?
        } else {
            resp
        };

        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(remote_error(resp, action).await)
        }
    }
}

#[async_trait]
impl TableStore for RemoteTableStore {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<()> {
        let url = format!("{}/insert", self.database_url);
        let body = json!({ "tableName": table, "records": records });

        self.send("insert", |token| {
            self.client.post(&url).bearer_auth(token).json(&body)
        })
        .await?;
        debug!("Remote insert into {} ok", table);
        Ok(())
    }

    async fn read(&self, table: &str, filter: &Filter) -> Result<Vec<Record>> {
        let url = format!("{}/read", self.database_url);
        let mut params = vec![("tableName".to_string(), table.to_string())];
        params.extend(filter.iter().map(|(k, v)| (k.clone(), query_text(v))));

        let resp = self
            .send("read", |token| {
                self.client.get(&url).bearer_auth(token).query(&params)
            })
            .await?;

        let rows: Vec<Value> = resp.json().await?;
        let records: Vec<Record> = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            // 远端按文本过滤，这里再按本地语义过一遍
            .filter(|r| filter.matches(r))
            .collect();

        debug!("Remote read {} returned {} records", table, records.len());
        Ok(records)
    }

    async fn update(
        &self,
        table: &str,
        id_column: &str,
        id_value: &Value,
        updates: Record,
    ) -> Result<()> {
        let url = format!("{}/update", self.database_url);
        let body = json!({
            "tableName": table,
            "idColumn": id_column,
            "idValue": id_value,
            "updates": updates,
        });

        self.send("update", |token| {
            self.client.put(&url).bearer_auth(token).json(&body)
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id_column: &str, id_value: &Value) -> Result<()> {
        let url = format!("{}/delete", self.database_url);
        let body = json!({
            "tableName": table,
            "idColumn": id_column,
            "idValue": id_value,
        });

        self.send("delete", |token| {
            self.client.delete(&url).bearer_auth(token).json(&body)
        })
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        if self.auth.verify_token().await? {
            return Ok(());
        }
        self.auth.renew().await
    }

    async fn close(&self) -> Result<()> {
        self.auth.logout().await
    }
}
