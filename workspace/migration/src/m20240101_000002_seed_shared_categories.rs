use model::entities::{Owner, TransactionKind, category};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use sea_orm_migration::prelude::*;

const SHARED_EXPENSE: [&str; 6] = [
    "Food",
    "Transport",
    "Utilities",
    "Entertainment",
    "Health",
    "Shopping",
];
const SHARED_INCOME: [&str; 4] = ["Salary", "Freelance", "Investments", "Gifts"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let expenses = SHARED_EXPENSE.iter().map(|name| (*name, TransactionKind::Expense));
        let incomes = SHARED_INCOME.iter().map(|name| (*name, TransactionKind::Income));
        for (name, kind) in expenses.chain(incomes) {
            category::ActiveModel::new_owned(Owner::Shared, name, kind)
                .insert(db)
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        category::Entity::delete_many()
            .filter(category::Column::UserId.is_null())
            .exec(manager.get_connection())
            .await?;

        Ok(())
    }
}
