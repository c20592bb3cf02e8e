use tracing::{debug, info};

use crate::cache::CacheResult;
use crate::errors::{PeerEvalError, Result};
use crate::models::auth::{User, UserRecord};
use crate::storage::{Filter, TableStoreExt};

use super::AuthService;

pub(super) fn revoked_key(token: &str) -> String {
    format!("revoked:{token}")
}

pub(super) fn user_key(token: &str) -> String {
    format!("user:{token}")
}

pub fn handle_refresh(service: &AuthService, refresh_token: &str) -> Result<String> {
    service
        .jwt
        .refresh_access_token(refresh_token)
        .map_err(|e| {
            info!("Refresh token rejected: {}", e);
            PeerEvalError::authentication("Login expired or invalid, please login again")
        })
}

pub async fn handle_authenticate(service: &AuthService, token: &str) -> Result<User> {
    let claims = service.jwt.verify_access_token(token).map_err(|e| {
        info!("JWT token validation failed: {}", e);
        PeerEvalError::authentication("Invalid JWT token")
    })?;

    if let CacheResult::Found(_) = service.cache.get_raw(&revoked_key(token)).await {
        return Err(PeerEvalError::authentication("Token has been revoked"));
    }

    // 先查按 token 缓存的用户
    match service.cache.get::<User>(&user_key(token)).await {
        CacheResult::Found(user) => return Ok(user),
        CacheResult::ExistsButNoValue => service.cache.remove(&user_key(token)).await,
        CacheResult::NotFound => debug!("User not found in cache for token"),
    }

    let user = service
        .store
        .find_row::<UserRecord>(&Filter::new().eq("email", claims.sub.as_str()))
        .await?
        .ok_or_else(|| PeerEvalError::authentication("User not found"))?
        .to_user();

    service
        .cache
        .insert(user_key(token), &user, claims.remaining_secs())
        .await;
    Ok(user)
}
