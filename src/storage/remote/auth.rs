//! 远程认证客户端
//!
//! 使用配置中的服务账号登录远程认证 API，持有 access/refresh token。

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::RemoteConfig;
use crate::errors::{PeerEvalError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedToken {
    access_token: String,
}

/// 从失败响应中提取远程 `message` 字段
pub(super) async fn remote_error(resp: Response, action: &str) -> PeerEvalError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}"));

    error!("Remote {} failed ({}): {}", action, status, message);
    PeerEvalError::remote_api(format!("{action} failed: {message}"))
}

pub struct RemoteAuthClient {
    client: Client,
    auth_url: String,
    email: String,
    password: String,
    session: RwLock<Option<RemoteSession>>,
}

impl RemoteAuthClient {
    pub fn new(client: Client, config: &RemoteConfig) -> Self {
        Self {
            client,
            auth_url: format!(
                "{}/auth/{}",
                config.base_url.trim_end_matches('/'),
                config.project_id
            ),
            email: config.email.clone(),
            password: config.password.clone(),
            session: RwLock::new(None),
        }
    }

    /// 当前 access token，没有会话时先登录
    pub async fn access_token(&self) -> Result<String> {
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok(session.access_token.clone());
        }
        self.login().await?;
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| PeerEvalError::authentication("Remote session missing after login"))
    }

    /// 服务账号登录
    pub async fn login(&self) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/login", self.auth_url))
            .json(&json!({ "email": self.email, "password": self.password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(remote_error(resp, "login").await);
        }

        let session: RemoteSession = resp.json().await?;
        *self.session.write().await = Some(session);
        info!("Remote session opened for {}", self.email);
        Ok(())
    }

    /// 用 refresh token 换新的 access token，成功返回 true
    pub async fn refresh(&self) -> Result<bool> {
        let refresh_token = match self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
        {
            Some(token) => token,
            None => return Ok(false),
        };

        let resp = self
            .client
            .post(format!("{}/refresh-token", self.auth_url))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!("Remote token refresh rejected: {}", resp.status());
            return Ok(false);
        }

        let refreshed: RefreshedToken = resp.json().await?;
        if let Some(session) = self.session.write().await.as_mut() {
            session.access_token = refreshed.access_token;
        }
        debug!("Remote access token refreshed");
        Ok(true)
    }

    /// 刷新失败时重新登录
    pub async fn renew(&self) -> Result<()> {
        if self.refresh().await? {
            return Ok(());
        }
        self.login().await
    }

    /// 校验当前 access token
    pub async fn verify_token(&self) -> Result<bool> {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => return Ok(false),
        };

        let resp = self
            .client
            .get(format!("{}/verify-token", self.auth_url))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(resp.status() == StatusCode::OK)
    }

    /// 注销远程会话
    pub async fn logout(&self) -> Result<()> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        let resp = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .bearer_auth(session.access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(remote_error(resp, "logout").await);
        }
        info!("Remote session closed");
        Ok(())
    }
}
