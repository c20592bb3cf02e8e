use tracing::info;

use crate::errors::{PeerEvalError, Result};

use super::AuthService;
use super::token::{revoked_key, user_key};

/// 吊销 access token 直到其自然过期
pub async fn handle_logout(service: &AuthService, token: &str) -> Result<()> {
    let claims = service
        .jwt
        .verify_access_token(token)
        .map_err(|_| PeerEvalError::authentication("Invalid JWT token"))?;

    let ttl = claims.remaining_secs().max(1);
    service
        .cache
        .insert_raw(revoked_key(token), claims.sub.clone(), ttl)
        .await;
    service.cache.remove(&user_key(token)).await;

    info!("User {} logged out", claims.sub);
    Ok(())
}
