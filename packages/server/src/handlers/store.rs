use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::sea_query::{Expr, ExprTrait, Func, SimpleExpr};
use sea_orm::*;
use tracing::instrument;

use crate::authz::{self, Action};
use crate::entity::{rating, store, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::shared::escape_like;
use crate::models::store::{
    MyStoreResponse, StoreDetailResponse, StoreListQuery, StoreRatingRow, StoreRow,
    store_sort_column,
};
use crate::state::AppState;
use crate::utils::store::find_store;

/// Case-insensitive substring match with LIKE wildcards escaped, so a
/// search for "50%" matches the literal text.
pub(crate) fn contains<C>(column: C, needle: &str) -> SimpleExpr
where
    C: ColumnTrait,
{
    Expr::expr(Func::lower(Expr::col(column)))
        .like(format!("%{}%", escape_like(needle).to_lowercase()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Stores",
    operation_id = "listStores",
    summary = "Browse stores with the caller's own rating annotated",
    description = "The user-facing directory: every store with its live aggregate, plus \
        `my_rating` showing how the caller rated it (null if they have not). Filterable by name \
        and address, sortable by any allow-listed field. Role `user` only.",
    params(StoreListQuery),
    responses(
        (status = 200, description = "Stores", body = [StoreRow]),
        (status = 400, description = "Unknown sort field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_stores(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Vec<StoreRow>>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::BrowseStores)?;

    let sort_column = store_sort_column(query.sort_by.as_deref())?;
    let sort_order = query.sort_order.unwrap_or_default();

    let mut select = store::Entity::find();
    if let Some(name) = query.name.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(store::Column::Name, name.trim()));
    }
    if let Some(address) = query.address.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(store::Column::Address, address.trim()));
    }
    let stores = select
        .order_by(sort_column, sort_order.into())
        .order_by_asc(store::Column::Id)
        .all(&state.db)
        .await?;

    // The caller's ratings in one pass, merged in memory rather than as an
    // extra join per row.
    let my_ratings: HashMap<i32, i32> = rating::Entity::find()
        .filter(rating::Column::UserId.eq(auth_user.user_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|r| (r.store_id, r.value))
        .collect();

    let rows = stores
        .into_iter()
        .map(|s| StoreRow {
            my_rating: my_ratings.get(&s.id).copied(),
            id: s.id,
            name: s.name,
            email: s.email,
            address: s.address,
            average_rating: s.average_rating,
            total_ratings: s.total_ratings,
        })
        .collect();

    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Stores",
    operation_id = "getStoreDetails",
    summary = "Get one store's public details",
    params(("id" = i32, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store details", body = StoreDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Store not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, store_id = id))]
pub async fn get_store_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StoreDetailResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::ViewStoreDetails)?;

    let store = find_store(&state.db, id).await?;

    let owner_name = match store.owner_id {
        Some(owner_id) => user::Entity::find_by_id(owner_id)
            .one(&state.db)
            .await?
            .map(|u| u.name),
        None => None,
    };

    Ok(Json(StoreDetailResponse {
        id: store.id,
        name: store.name,
        email: store.email,
        address: store.address,
        owner_name,
        average_rating: store.average_rating,
        total_ratings: store.total_ratings,
        created_at: store.created_at,
    }))
}

#[utoipa::path(
    get,
    path = "/my/store",
    tag = "Stores",
    operation_id = "getMyStore",
    summary = "Get the caller's own store with every rating it has received",
    description = "The store-owner dashboard: the owned store's aggregate plus the full rating \
        list with rater names and emails. 404 when no store is assigned to the caller. Role \
        `store_owner` only.",
    responses(
        (status = 200, description = "The owned store", body = MyStoreResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No store assigned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_my_store(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MyStoreResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::ViewOwnStore)?;

    let store = store::Entity::find()
        .filter(store::Column::OwnerId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No store assigned to this account".into()))?;

    let ratings = rating::Entity::find()
        .filter(rating::Column::StoreId.eq(store.id))
        .find_also_related(user::Entity)
        .order_by_desc(rating::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(r, rater)| {
            rater.map(|u| StoreRatingRow {
                user_id: r.user_id,
                user_name: u.name,
                user_email: u.email,
                value: r.value,
                created_at: r.created_at,
            })
        })
        .collect();

    Ok(Json(MyStoreResponse {
        id: store.id,
        name: store.name,
        email: store.email,
        address: store.address,
        average_rating: store.average_rating,
        total_ratings: store.total_ratings,
        ratings,
    }))
}
