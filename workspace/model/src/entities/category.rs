use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::transaction::TransactionKind;

/// Who a category belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    /// Created by, and writable only by, this user.
    Personal(i32),
    /// Seeded for everyone; read-only to regular callers.
    Shared,
}

impl Owner {
    pub fn from_user_id(user_id: Option<i32>) -> Self {
        match user_id {
            Some(id) => Owner::Personal(id),
            None => Owner::Shared,
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        match self {
            Owner::Personal(id) => Some(*id),
            Owner::Shared => None,
        }
    }

    /// A category may be referenced by a user when it is shared or their own.
    pub fn is_visible_to(&self, user_id: i32) -> bool {
        match self {
            Owner::Shared => true,
            Owner::Personal(owner) => *owner == user_id,
        }
    }
}

/// Represents a category for transactions.
/// A category only labels transactions of its own `transaction_type`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning user. Use [`Model::owner`] instead of inspecting this directly.
    pub user_id: Option<i32>,
    pub name: String,
    pub transaction_type: TransactionKind,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
    #[sea_orm(has_many = "super::budget::Entity")]
    Budget,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn owner(&self) -> Owner {
        Owner::from_user_id(self.user_id)
    }

    pub fn is_visible_to(&self, user_id: i32) -> bool {
        self.owner().is_visible_to(user_id)
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.owner() == Owner::Personal(user_id)
    }
}

impl ActiveModel {
    /// A new category with the given owner, stamped with the current time.
    pub fn new_owned(owner: Owner, name: &str, transaction_type: TransactionKind) -> Self {
        Self {
            user_id: Set(owner.user_id()),
            name: Set(name.to_string()),
            transaction_type: Set(transaction_type),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }
}
