use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Represents a user of the system.
/// Requests are attributed to a user through their API token.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Opaque token sent as `Authorization: Token <api_token>`.
    #[sea_orm(unique)]
    pub api_token: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category::Entity")]
    Category,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
    #[sea_orm(has_many = "super::budget::Entity")]
    Budget,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
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
    /// Looks up the user owning the given API token.
    pub async fn find_by_token<C: ConnectionTrait>(
        db: &C,
        token: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::ApiToken.eq(token))
            .one(db)
            .await
    }
}

/// Generates a fresh API token.
pub fn generate_api_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_hex() {
        let first = generate_api_token();
        let second = generate_api_token();

        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
