use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, SqlErr};
use tracing::{info, instrument, warn};

use super::{Result, StoreError};
use crate::entities::user;

const MAX_USERNAME_LENGTH: usize = 150;

/// Provisions a user with a freshly generated API token.
#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(StoreError::validation(
            "username",
            format!("Username must be 1 to {} characters.", MAX_USERNAME_LENGTH),
        ));
    }

    let created = user::ActiveModel {
        username: Set(username.to_string()),
        api_token: Set(user::generate_api_token()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match created {
        Ok(user) => {
            info!("User created with ID: {}, username: {}", user.id, user.username);
            Ok(user)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!("Username '{}' already exists", username);
            Err(StoreError::validation(
                "username",
                format!("Username '{}' already exists.", username),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
