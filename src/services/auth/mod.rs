//! 本地账号认证
//!
//! 注册、登录、刷新、注销，以及中间件用的 access token 解析。

pub mod login;
pub mod logout;
pub mod register;
pub mod token;

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::config::Argon2Config;
use crate::errors::Result;
use crate::models::auth::{LoginRequest, SignupRequest, User};
use crate::storage::TableStore;
use crate::utils::jwt::{JwtUtils, TokenPair};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn TableStore>,
    cache: Arc<dyn ObjectCache>,
    jwt: Arc<JwtUtils>,
    argon2: Argon2Config,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn TableStore>,
        cache: Arc<dyn ObjectCache>,
        jwt: Arc<JwtUtils>,
        argon2: Argon2Config,
    ) -> Self {
        Self {
            store,
            cache,
            jwt,
            argon2,
        }
    }

    pub fn jwt(&self) -> &JwtUtils {
        &self.jwt
    }

    // 用户注册
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
        register::handle_signup(self, request).await
    }

    // 登录验证
    pub async fn login(&self, request: LoginRequest) -> Result<(User, TokenPair)> {
        login::handle_login(self, request).await
    }

    // 刷新令牌
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        token::handle_refresh(self, refresh_token)
    }

    // 吊销 access token
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        logout::handle_logout(self, access_token).await
    }

    // 解析 access token 对应的用户
    pub async fn authenticate(&self, access_token: &str) -> Result<User> {
        token::handle_authenticate(self, access_token).await
    }
}
