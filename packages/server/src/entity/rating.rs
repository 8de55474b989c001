use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One rating per (user, store): the composite primary key makes a second
/// row for the same pair impossible at the schema level.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(primary_key)]
    pub store_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,
    #[sea_orm(belongs_to, from = "store_id", to = "id")]
    pub store: Option<super::store::Entity>,

    /// 1..=5, validated before any database access.
    pub value: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
