use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info, instrument, warn};

use super::{Result, StoreError, money, validate_amount};
use crate::entities::{TransactionKind, budget, category};

/// A budget row with the category it limits.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecord {
    pub budget: budget::Model,
    pub category: category::Model,
}

impl BudgetRecord {
    fn new(mut budget: budget::Model, category: category::Model) -> Self {
        budget.amount = money(budget.amount);
        Self { budget, category }
    }
}

/// Result of an upsert; `created` is false when an existing row was updated.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub record: BudgetRecord,
    pub created: bool,
}

async fn budget_category(
    db: &DatabaseConnection,
    user_id: i32,
    category_id: i32,
) -> Result<category::Model> {
    let category = match category::Entity::find_by_id(category_id).one(db).await? {
        Some(category) if category.is_visible_to(user_id) => category,
        _ => {
            warn!("User {} tried to budget unknown category {}", user_id, category_id);
            return Err(StoreError::validation(
                "category",
                format!("Invalid pk \"{}\" - object does not exist.", category_id),
            ));
        }
    };
    if category.transaction_type != TransactionKind::Expense {
        return Err(StoreError::validation(
            "category",
            format!("Budgets can only be set on expense categories, '{}' is not one.", category.name),
        ));
    }
    Ok(category)
}

async fn find_pair(
    db: &DatabaseConnection,
    user_id: i32,
    category_id: i32,
) -> Result<Option<budget::Model>> {
    Ok(budget::Entity::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::CategoryId.eq(category_id))
        .one(db)
        .await?)
}

/// Rounds of insert-then-update tried before giving up on a row that keeps
/// disappearing under a concurrent delete.
const UPSERT_ATTEMPTS: usize = 3;

/// Inserts the (user, category) row unless it exists. Returns whether this
/// statement created it.
async fn insert_if_absent(
    db: &DatabaseConnection,
    user_id: i32,
    category_id: i32,
    amount: Decimal,
) -> Result<bool> {
    let row = budget::ActiveModel {
        user_id: Set(user_id),
        category_id: Set(category_id),
        amount: Set(amount),
        ..Default::default()
    };
    let inserted = budget::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([budget::Column::UserId, budget::Column::CategoryId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(inserted == 1)
}

/// Sets the user's limit for a category, creating the row on first use.
///
/// At most one row exists per (user, category); a second call only changes the amount.
/// `created` comes from the row count of the insert itself, so of two racing
/// first calls exactly one reports a creation.
#[instrument(skip(db))]
pub async fn upsert(
    db: &DatabaseConnection,
    user_id: i32,
    category_id: i32,
    amount: Decimal,
) -> Result<UpsertOutcome> {
    let category = budget_category(db, user_id, category_id).await?;
    let amount = validate_amount(amount)?;

    for _ in 0..UPSERT_ATTEMPTS {
        let created = insert_if_absent(db, user_id, category_id, amount).await?;
        if !created {
            let updated = budget::Entity::update_many()
                .col_expr(budget::Column::Amount, Expr::value(amount))
                .filter(budget::Column::UserId.eq(user_id))
                .filter(budget::Column::CategoryId.eq(category_id))
                .exec(db)
                .await?;
            if updated.rows_affected == 0 {
                debug!("Budget for category {} vanished before update, retrying", category_id);
                continue;
            }
        }

        let Some(budget) = find_pair(db, user_id, category_id).await? else {
            continue;
        };
        if created {
            info!("Budget created with ID: {}", budget.id);
        } else {
            info!("Budget {} for category {} set to {}", budget.id, category_id, amount);
        }
        return Ok(UpsertOutcome {
            record: BudgetRecord::new(budget, category),
            created,
        });
    }

    warn!("Gave up upserting budget for category {} of user {}", category_id, user_id);
    Err(StoreError::NotFound)
}

/// Lists the user's budgets ordered by category name.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, user_id: i32) -> Result<Vec<BudgetRecord>> {
    let rows = budget::Entity::find()
        .filter(budget::Column::UserId.eq(user_id))
        .find_also_related(category::Entity)
        .order_by_asc(category::Column::Name)
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await?;

    debug!("Found {} budgets for user {}", rows.len(), user_id);
    // category_id is NOT NULL with a cascading FK, so the join always matches
    Ok(rows
        .into_iter()
        .filter_map(|(budget, category)| category.map(|c| BudgetRecord::new(budget, c)))
        .collect())
}

/// Deletes one of the user's budgets.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32, user_id: i32) -> Result<()> {
    let result = budget::Entity::delete_many()
        .filter(budget::Column::Id.eq(id))
        .filter(budget::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(StoreError::NotFound);
    }
    info!("Budget {} deleted for user {}", id, user_id);
    Ok(())
}
