use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info, instrument, warn};

use super::{Result, StoreError};
use crate::entities::category::{self, Owner};
use crate::entities::{TransactionKind, budget, transaction};

const MAX_NAME_LENGTH: usize = 100;

/// Rows owned by `user_id` or shared with everyone.
pub(crate) fn visible_to(user_id: i32) -> Condition {
    Condition::any()
        .add(category::Column::UserId.eq(user_id))
        .add(category::Column::UserId.is_null())
}

/// Lists the categories a user may reference, optionally of one kind only.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    user_id: i32,
    kind: Option<TransactionKind>,
) -> Result<Vec<category::Model>> {
    let mut query = category::Entity::find().filter(visible_to(user_id));
    if let Some(kind) = kind {
        query = query.filter(category::Column::TransactionType.eq(kind));
    }

    let categories = query.order_by_asc(category::Column::Id).all(db).await?;
    debug!("Found {} categories visible to user {}", categories.len(), user_id);
    Ok(categories)
}

/// Fetches a category the user may reference.
#[instrument(skip(db))]
pub async fn find_visible(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
) -> Result<category::Model> {
    match category::Entity::find_by_id(id).one(db).await? {
        Some(category) if category.is_visible_to(user_id) => Ok(category),
        _ => Err(StoreError::NotFound),
    }
}

async fn find_owned(db: &DatabaseConnection, id: i32, user_id: i32) -> Result<category::Model> {
    match category::Entity::find_by_id(id).one(db).await? {
        Some(category) if category.is_owned_by(user_id) => Ok(category),
        _ => Err(StoreError::NotFound),
    }
}

fn clean_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::validation("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(StoreError::validation(
            "name",
            format!("Ensure this field has no more than {} characters.", MAX_NAME_LENGTH),
        ));
    }
    Ok(name)
}

fn duplicate_name(name: &str, kind: TransactionKind) -> StoreError {
    StoreError::validation(
        "name",
        format!("You already have a {} category named '{}'.", kind.label(), name),
    )
}

async fn name_taken(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
    kind: TransactionKind,
    except_id: Option<i32>,
) -> Result<bool> {
    let mut query = category::Entity::find()
        .filter(category::Column::UserId.eq(user_id))
        .filter(category::Column::Name.eq(name))
        .filter(category::Column::TransactionType.eq(kind));
    if let Some(id) = except_id {
        query = query.filter(category::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

/// Creates a personal category for `user_id`.
#[instrument(skip(db))]
pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
    kind: TransactionKind,
) -> Result<category::Model> {
    let name = clean_name(name)?;

    if name_taken(db, user_id, name, kind, None).await? {
        warn!("Category '{}' ({}) already exists for user {}", name, kind, user_id);
        return Err(duplicate_name(name, kind));
    }

    match category::ActiveModel::new_owned(Owner::Personal(user_id), name, kind)
        .insert(db)
        .await
    {
        Ok(category) => {
            info!("Category created with ID: {}", category.id);
            Ok(category)
        }
        // Lost a race against an identical insert
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(duplicate_name(name, kind))
        }
        Err(e) => Err(e.into()),
    }
}

/// Renames one of the user's own categories. The type never changes.
#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
    name: &str,
) -> Result<category::Model> {
    let existing = find_owned(db, id, user_id).await?;
    let name = clean_name(name)?;
    let kind = existing.transaction_type;

    if name_taken(db, user_id, name, kind, Some(id)).await? {
        return Err(duplicate_name(name, kind));
    }

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    match active.update(db).await {
        Ok(category) => {
            info!("Category {} renamed to '{}'", id, category.name);
            Ok(category)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(duplicate_name(name, kind))
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes one of the user's own categories.
///
/// Transactions keep existing with no category; budgets for it are removed.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32, user_id: i32) -> Result<()> {
    let existing = find_owned(db, id, user_id).await?;

    let txn = db.begin().await?;
    let detached = transaction::Entity::update_many()
        .col_expr(transaction::Column::CategoryId, Expr::value(Option::<i32>::None))
        .filter(transaction::Column::CategoryId.eq(existing.id))
        .exec(&txn)
        .await?;
    let budgets = budget::Entity::delete_many()
        .filter(budget::Column::CategoryId.eq(existing.id))
        .exec(&txn)
        .await?;
    category::Entity::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Category {} deleted ({} transactions detached, {} budgets removed)",
        id, detached.rows_affected, budgets.rows_affected
    );
    Ok(())
}
