use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub address: String,

    /// Weak reference: deleting the owner clears this, never the store.
    pub owner_id: Option<i32>,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: Option<super::user::Entity>,

    /// Derived cache over this store's ratings. Refreshed in the same
    /// transaction as every rating mutation; one fractional digit.
    #[sea_orm(column_type = "Decimal(Some((2, 1)))")]
    pub average_rating: Decimal,
    pub total_ratings: i32,

    #[sea_orm(has_many)]
    pub ratings: HasMany<super::rating::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
