use axum::Json;
use axum::extract::{Path, State};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::authz::{self, Action};
use crate::entity::rating;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::rating::{
    MyRatingResponse, RatingSummaryResponse, SubmitRatingRequest, validate_submit_rating,
};
use crate::state::AppState;
use crate::utils::store::{find_store, find_store_for_update, refresh_rating_summary};

#[utoipa::path(
    post,
    path = "/",
    tag = "Ratings",
    operation_id = "submitRating",
    summary = "Submit or replace the caller's rating for a store",
    description = "Upserts the caller's rating keyed on (user, store): a first submission creates \
        the rating, a repeat submission replaces the value in place. The store's aggregate is \
        recomputed from the full rating set inside the same transaction, so the returned summary \
        is never stale. Role `user` only.",
    request_body = SubmitRatingRequest,
    responses(
        (status = 200, description = "Rating recorded; fresh aggregate returned", body = RatingSummaryResponse),
        (status = 400, description = "Rating outside 1-5 (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Store not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, store_id = payload.store_id))]
pub async fn submit_rating(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitRatingRequest>,
) -> Result<Json<RatingSummaryResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::SubmitRating)?;
    validate_submit_rating(&payload)?;

    let txn = state.db.begin().await?;

    // Row-lock the store: concurrent submissions for the same store
    // serialize here, so each committed aggregate reflects all ratings.
    let store = find_store_for_update(&txn, payload.store_id).await?;

    // Atomic insert-or-replace on the composite key. Never a read-then-write
    // pair: two racing submissions from the same user cannot produce two rows.
    let model = rating::ActiveModel {
        user_id: Set(auth_user.user_id),
        store_id: Set(store.id),
        value: Set(payload.value),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    rating::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([rating::Column::UserId, rating::Column::StoreId])
                .update_column(rating::Column::Value)
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let summary = refresh_rating_summary(&txn, store.id).await?;
    txn.commit().await?;

    Ok(Json(RatingSummaryResponse {
        store_id: store.id,
        average_rating: summary.average,
        total_ratings: summary.total,
    }))
}

#[utoipa::path(
    delete,
    path = "/store/{store_id}",
    tag = "Ratings",
    operation_id = "deleteRating",
    summary = "Delete the caller's rating for a store",
    description = "Removes the caller's rating and recomputes the store's aggregate in the same \
        transaction; the average becomes 0.0 when the last rating goes. 404 if the caller has no \
        rating for this store, in which case no aggregate is touched. Role `user` only.",
    params(("store_id" = i32, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Rating deleted; fresh aggregate returned", body = RatingSummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No such rating (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, store_id = store_id))]
pub async fn delete_rating(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(store_id): Path<i32>,
) -> Result<Json<RatingSummaryResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::DeleteOwnRating)?;

    let txn = state.db.begin().await?;

    let store = find_store_for_update(&txn, store_id).await?;

    let result = rating::Entity::delete_by_id((auth_user.user_id, store.id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        // Nothing was removed, nothing to refresh; the transaction is
        // dropped without committing.
        return Err(AppError::NotFound("Rating not found".into()));
    }

    let summary = refresh_rating_summary(&txn, store.id).await?;
    txn.commit().await?;

    Ok(Json(RatingSummaryResponse {
        store_id: store.id,
        average_rating: summary.average,
        total_ratings: summary.total,
    }))
}

#[utoipa::path(
    get,
    path = "/store/{store_id}/my-rating",
    tag = "Ratings",
    operation_id = "getMyRating",
    summary = "Get the caller's own rating for a store",
    params(("store_id" = i32, Path, description = "Store ID")),
    responses(
        (status = 200, description = "The caller's rating, value null if none", body = MyRatingResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Store not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, store_id = store_id))]
pub async fn get_my_rating(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(store_id): Path<i32>,
) -> Result<Json<MyRatingResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::BrowseStores)?;

    let store = find_store(&state.db, store_id).await?;

    let rating = rating::Entity::find_by_id((auth_user.user_id, store.id))
        .one(&state.db)
        .await?;

    Ok(Json(MyRatingResponse {
        store_id: store.id,
        value: rating.as_ref().map(|r| r.value),
        created_at: rating.map(|r| r.created_at),
    }))
}
