//! This file serves as the root for all SeaORM entity modules.
//! Expenses and incomes share one `transactions` table, told apart by
//! their `TransactionKind`.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use category::Owner;
pub use transaction::TransactionKind;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget::Entity as Budget;
    pub use super::category::Entity as Category;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = user::ActiveModel {
            username: Set("alice".to_string()),
            api_token: Set(user::generate_api_token()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Shared categories are seeded by the migrations
        let shared = Category::find()
            .filter(category::Column::UserId.is_null())
            .all(&db)
            .await?;
        assert!(!shared.is_empty());
        let food = shared
            .iter()
            .find(|c| c.name == "Food" && c.transaction_type == TransactionKind::Expense)
            .expect("Food should be seeded")
            .clone();

        let coffee = transaction::ActiveModel {
            user_id: Set(alice.id),
            kind: Set(TransactionKind::Expense),
            category_id: Set(Some(food.id)),
            title: Set("Coffee".to_string()),
            amount: Set(Decimal::new(450, 2)),
            date: Set(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let (found, found_category) = Transaction::find_by_id(coffee.id)
            .find_also_related(Category)
            .one(&db)
            .await?
            .expect("transaction should exist");
        assert_eq!(found.title, "Coffee");
        assert_eq!(found_category.map(|c| c.name), Some("Food".to_string()));

        let budget = budget::ActiveModel {
            user_id: Set(alice.id),
            category_id: Set(food.id),
            amount: Set(Decimal::new(500, 0)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        assert_eq!(budget.user_id, alice.id);

        // A second budget row for the same pair violates the unique index
        let duplicate = budget::ActiveModel {
            user_id: Set(alice.id),
            category_id: Set(food.id),
            amount: Set(Decimal::new(700, 0)),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err());

        // Deleting the user removes their rows but keeps shared categories
        alice.delete(&db).await?;
        assert!(Transaction::find_by_id(coffee.id).one(&db).await?.is_none());
        assert!(Budget::find_by_id(budget.id).one(&db).await?.is_none());
        assert!(Category::find_by_id(food.id).one(&db).await?.is_some());
        assert!(User::find().all(&db).await?.is_empty());

        Ok(())
    }
}
