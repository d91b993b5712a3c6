use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use super::{Filters, Result, StoreError, money, validate_amount};
use crate::entities::{TransactionKind, category, transaction};

const MAX_TITLE_LENGTH: usize = 255;

/// A transaction together with the category it is labelled with.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub transaction: transaction::Model,
    pub category: Option<category::Model>,
}

impl TransactionRecord {
    fn new(mut transaction: transaction::Model, category: Option<category::Model>) -> Self {
        transaction.amount = money(transaction.amount);
        Self {
            transaction,
            category,
        }
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Fields for a new transaction. The owner always comes from the caller.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub title: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Option<i32>,
}

/// Partial update. `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<Option<i32>>,
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::validation("title", "This field may not be blank."));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(StoreError::validation(
            "title",
            format!("Ensure this field has no more than {} characters.", MAX_TITLE_LENGTH),
        ));
    }
    Ok(title.to_string())
}

/// Resolves a category reference for a transaction of `kind` owned by `user_id`.
async fn resolve_category(
    db: &DatabaseConnection,
    user_id: i32,
    kind: TransactionKind,
    category_id: Option<i32>,
) -> Result<Option<category::Model>> {
    let Some(category_id) = category_id else {
        return Ok(None);
    };

    let category = match category::Entity::find_by_id(category_id).one(db).await? {
        Some(category) if category.is_visible_to(user_id) => category,
        _ => {
            warn!("User {} referenced unknown category {}", user_id, category_id);
            return Err(StoreError::validation(
                "category",
                format!("Invalid pk \"{}\" - object does not exist.", category_id),
            ));
        }
    };

    if category.transaction_type != kind {
        warn!(
            "Category {} is {} but the transaction is {}",
            category.id, category.transaction_type, kind
        );
        return Err(StoreError::validation(
            "category",
            format!(
                "Category '{}' is an {} category and cannot label an {}.",
                category.name,
                category.transaction_type.label(),
                kind.label()
            ),
        ));
    }

    Ok(Some(category))
}

fn owned(id: i32, user_id: i32, kind: TransactionKind) -> sea_orm::Select<transaction::Entity> {
    transaction::Entity::find_by_id(id)
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::Kind.eq(kind))
}

/// Lists the user's transactions of `kind`, most recent first.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    user_id: i32,
    kind: TransactionKind,
    filters: &Filters,
) -> Result<Vec<TransactionRecord>> {
    let rows = transaction::Entity::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::Kind.eq(kind))
        .filter(filters.condition())
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .find_also_related(category::Entity)
        .all(db)
        .await?;

    debug!("Retrieved {} {} rows for user {}", rows.len(), kind, user_id);
    Ok(rows
        .into_iter()
        .map(|(transaction, category)| TransactionRecord::new(transaction, category))
        .collect())
}

/// Fetches one of the user's transactions.
#[instrument(skip(db))]
pub async fn get(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
    kind: TransactionKind,
) -> Result<TransactionRecord> {
    owned(id, user_id, kind)
        .find_also_related(category::Entity)
        .one(db)
        .await?
        .map(|(transaction, category)| TransactionRecord::new(transaction, category))
        .ok_or(StoreError::NotFound)
}

/// Records a new transaction owned by `user_id`.
#[instrument(skip(db))]
pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    kind: TransactionKind,
    new: NewTransaction,
) -> Result<TransactionRecord> {
    let title = clean_title(&new.title)?;
    let amount = validate_amount(new.amount)?;
    let category = resolve_category(db, user_id, kind, new.category_id).await?;

    let model = transaction::ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind),
        category_id: Set(category.as_ref().map(|c| c.id)),
        title: Set(title),
        amount: Set(amount),
        date: Set(new.date),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created {} {} for user {}: {} {}",
        kind, model.id, user_id, model.title, model.amount
    );
    Ok(TransactionRecord::new(model, category))
}

/// Applies `changes` to one of the user's transactions. Owner and kind never change.
#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
    kind: TransactionKind,
    changes: TransactionChanges,
) -> Result<TransactionRecord> {
    let (existing, current_category) = owned(id, user_id, kind)
        .find_also_related(category::Entity)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)?;

    let mut active: transaction::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(clean_title(&title)?);
    }
    if let Some(amount) = changes.amount {
        active.amount = Set(validate_amount(amount)?);
    }
    if let Some(date) = changes.date {
        active.date = Set(date);
    }
    let category = match changes.category_id {
        Some(category_id) => {
            let category = resolve_category(db, user_id, kind, category_id).await?;
            active.category_id = Set(category.as_ref().map(|c| c.id));
            category
        }
        None => current_category,
    };

    let model = active.update(db).await?;
    info!("Updated {} {} for user {}", kind, id, user_id);
    Ok(TransactionRecord::new(model, category))
}

/// Deletes one of the user's transactions.
#[instrument(skip(db))]
pub async fn delete(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
    kind: TransactionKind,
) -> Result<()> {
    // Ownership is part of the delete predicate itself
    let result = transaction::Entity::delete_many()
        .filter(transaction::Column::Id.eq(id))
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::Kind.eq(kind))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!("{} {} not found for user {}", kind, id, user_id);
        return Err(StoreError::NotFound);
    }
    info!("Deleted {} {} for user {}", kind, id, user_id);
    Ok(())
}
