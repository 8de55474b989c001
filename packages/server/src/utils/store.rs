use sea_orm::sea_query::LockType;
use sea_orm::*;

use crate::aggregate;
use crate::entity::{rating, store, user};
use crate::error::AppError;

/// Look up a store by ID, returning 404 if not found.
pub async fn find_store<C: ConnectionTrait>(db: &C, id: i32) -> Result<store::Model, AppError> {
    store::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
}

/// Look up a store with a row lock, serializing concurrent aggregate
/// refreshes for the same store behind this transaction.
pub async fn find_store_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<store::Model, AppError> {
    store::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
}

/// Look up a user by ID, returning 404 if not found.
pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Recompute a store's `average_rating`/`total_ratings` from its full rating
/// set and write them to the store row.
///
/// Must run inside the same transaction as the rating mutation it follows:
/// the rating table is ground truth and the aggregate columns are a cache
/// that is only ever refreshed together with the write that invalidated it.
pub async fn refresh_rating_summary<C: ConnectionTrait>(
    db: &C,
    store_id: i32,
) -> Result<aggregate::RatingSummary, AppError> {
    let values: Vec<i32> = rating::Entity::find()
        .filter(rating::Column::StoreId.eq(store_id))
        .select_only()
        .column(rating::Column::Value)
        .into_tuple()
        .all(db)
        .await?;

    let summary = aggregate::summarize(&values);

    let active = store::ActiveModel {
        id: Set(store_id),
        average_rating: Set(summary.average),
        total_ratings: Set(summary.total),
        ..Default::default()
    };
    store::Entity::update(active).exec(db).await?;

    Ok(summary)
}
