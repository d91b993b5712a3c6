use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::{TransactionKind, category, user};
use model::store::transactions::{self, NewTransaction, TransactionRecord};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use std::str::FromStr;

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

/// Records a transaction through the store, panicking on failure.
pub async fn record(
    db: &DatabaseConnection,
    user_id: i32,
    kind: TransactionKind,
    title: &str,
    amount: &str,
    date: NaiveDate,
    category_id: Option<i32>,
) -> TransactionRecord {
    transactions::create(
        db,
        user_id,
        kind,
        NewTransaction {
            title: title.to_string(),
            amount: dec(amount),
            date,
            category_id,
        },
    )
    .await
    .expect("Failed to record transaction")
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
