use axum::Router;
use axum::http::HeaderValue;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use model::store::users;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::router::create_router;
use crate::schemas::AppState;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    AppState {
        db: setup_test_db().await,
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level comes from RUST_LOG and defaults to WARN. The returned
/// guard uninstalls the subscriber when dropped.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    create_router(setup_test_app_state().await)
}

/// Test server plus the state behind it, for seeding rows directly
pub async fn setup_test_server() -> (TestServer, AppState) {
    let state = setup_test_app_state().await;
    let server = TestServer::new(create_router(state.clone())).expect("Failed to start test server");
    (server, state)
}

/// Provisions a user and returns their `Authorization` header value
pub async fn create_test_user(state: &AppState, username: &str) -> HeaderValue {
    let user = users::create(&state.db, username)
        .await
        .expect("Failed to create test user");
    token_header(&user.api_token)
}

pub fn token_header(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Token {}", token)).expect("token is valid header text")
}
