use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

use crate::entities::{TransactionKind, category, user};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None).await.expect("Migrations failed.");
    db
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        api_token: Set(user::generate_api_token()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}

/// One of the seeded categories visible to everyone.
pub async fn shared_category(
    db: &DatabaseConnection,
    name: &str,
    kind: TransactionKind,
) -> category::Model {
    category::Entity::find()
        .filter(category::Column::UserId.is_null())
        .filter(category::Column::Name.eq(name))
        .filter(category::Column::TransactionType.eq(kind))
        .one(db)
        .await
        .expect("Failed to query categories")
        .expect("Shared category should be seeded")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
