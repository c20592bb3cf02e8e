use crate::config::JwtConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_COOKIE: &str = "refresh_token";

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // 用户邮箱
    pub token_type: String, // "access" 或 "refresh"
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    /// 距离过期的秒数，已过期为 0
    pub fn remaining_secs(&self) -> u64 {
        let now = chrono::Utc::now().timestamp().max(0) as usize;
        self.exp.saturating_sub(now) as u64
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT 签发与校验，密钥和有效期来自构造时的配置
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry: chrono::Duration,
    refresh_expiry: chrono::Duration,
    secure_cookie: bool,
}

impl JwtUtils {
    pub fn new(config: &JwtConfig, secure_cookie: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_expiry: chrono::Duration::minutes(config.access_token_expiry),
            refresh_expiry: chrono::Duration::days(config.refresh_token_expiry),
            secure_cookie,
        }
    }

    /// access token 有效期（秒）
    pub fn access_expiry_secs(&self) -> i64 {
        self.access_expiry.num_seconds()
    }

    fn generate_token(
        &self,
        email: &str,
        token_type: &str,
        expiry: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            token_type: token_type.to_string(),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn generate_access_token(&self, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate_token(email, "access", self.access_expiry)
    }

    pub fn generate_token_pair(
        &self,
        email: &str,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: self.generate_access_token(email)?,
            refresh_token: self.generate_token(email, "refresh", self.refresh_expiry)?,
        })
    }

    fn verify_token_type(
        &self,
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())?.claims;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.verify_token_type(token, "access")
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.verify_token_type(token, "refresh")
    }

    /// 使用 Refresh Token 生成新的 Access Token
    pub fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = self.verify_refresh_token(refresh_token)?;
        self.generate_access_token(&claims.sub)
    }

    /// 创建 Refresh Token Cookie
    pub fn create_refresh_token_cookie(&self, refresh_token: &str) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(
                self.refresh_expiry.num_seconds(),
            ))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(self.secure_cookie)
            .finish()
    }

    /// 创建空的 Refresh Token Cookie（用于注销）
    pub fn create_empty_refresh_token_cookie(&self) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, "")
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(self.secure_cookie)
            .finish()
    }

    /// 从请求中提取 Refresh Token
    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}
