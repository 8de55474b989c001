use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Trimmed and lowercased before insert.
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC hash, never returned to clients.
    pub password: String,
    pub address: Option<String>,
    /// One of: `admin`, `user`, `store_owner`.
    pub role: String,

    #[sea_orm(has_many)]
    pub ratings: HasMany<super::rating::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
