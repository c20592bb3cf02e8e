use tracing::info;

use crate::errors::{PeerEvalError, Result};
use crate::models::auth::{SignupRequest, User, UserRecord};
use crate::storage::{Filter, TableStoreExt};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

use super::AuthService;

pub async fn handle_signup(service: &AuthService, request: SignupRequest) -> Result<User> {
    let email = request.email.trim().to_lowercase();

    validate_email(&email).map_err(PeerEvalError::validation)?;
    validate_password(&request.password).map_err(PeerEvalError::validation)?;

    let name = match request.name {
        Some(name) => {
            validate_name("Name", &name).map_err(PeerEvalError::validation)?;
            name.trim().to_string()
        }
        None => email.split('@').next().unwrap_or(&email).to_string(),
    };

    if service
        .store
        .row_exists::<UserRecord>(&Filter::new().eq("email", email.as_str()))
        .await?
    {
        return Err(PeerEvalError::already_exists(format!(
            "User {email} already exists"
        )));
    }

    let record = UserRecord {
        email: email.clone(),
        name,
        password_hash: hash_password(&request.password, &service.argon2)?,
        created_at: chrono::Utc::now(),
    };
    service.store.insert_row(&record).await?;

    info!("User {} registered", email);
    Ok(record.to_user())
}
