use tracing::{error, info};

use crate::errors::{PeerEvalError, Result};
use crate::models::auth::{LoginRequest, User, UserRecord};
use crate::storage::{Filter, TableStoreExt};
use crate::utils::jwt::TokenPair;
use crate::utils::password::verify_password;

use super::AuthService;

pub async fn handle_login(service: &AuthService, request: LoginRequest) -> Result<(User, TokenPair)> {
    let email = request.email.trim().to_lowercase();

    let record = service
        .store
        .find_row::<UserRecord>(&Filter::new().eq("email", email.as_str()))
        .await?;

    // 用户不存在与密码错误返回同样的信息
    let Some(record) = record.filter(|r| verify_password(&request.password, &r.password_hash))
    else {
        return Err(PeerEvalError::authentication(
            "Email or password is incorrect",
        ));
    };

    let tokens = service.jwt.generate_token_pair(&record.email).map_err(|e| {
        error!("Failed to generate JWT token: {}", e);
        PeerEvalError::authentication("Login failed, unable to generate token")
    })?;

    info!("User {} logged in successfully", record.email);
    Ok((record.to_user(), tokens))
}
