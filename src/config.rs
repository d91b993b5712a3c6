use anyhow::Result;
use sea_orm::Database;
use tracing::info;

use crate::schemas::AppState;

/// Fallback used when neither `--database-url` nor `DATABASE_URL` is given
pub const DEFAULT_DATABASE_URL: &str = "sqlite://spendwise.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Connect to the database and build the shared application state
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;
    Ok(AppState { db })
}
