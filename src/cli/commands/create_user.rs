use anyhow::{Context, Result};
use model::store::users;
use tracing::info;

use super::initdb::connect_and_migrate;

/// Provisions a user from the command line and prints their API token
pub async fn create_user(username: &str, database_url: &str) -> Result<()> {
    let db = connect_and_migrate(database_url).await?;

    let user = users::create(&db, username)
        .await
        .with_context(|| format!("Failed to create user '{}'", username))?;
    info!("Created user {} ({})", user.username, user.id);

    println!("username: {}", user.username);
    println!("api_token: {}", user.api_token);

    db.close().await?;
    Ok(())
}
