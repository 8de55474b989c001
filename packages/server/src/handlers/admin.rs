use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::authz::{self, Action, Role};
use crate::entity::{rating, store, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::store::contains;
use crate::models::admin::DashboardStatsResponse;
use crate::models::shared::normalize_email;
use crate::models::store::{
    AdminStoreRow, CreateStoreRequest, CreateStoreResponse, StoreListQuery, store_sort_column,
    validate_create_store,
};
use crate::models::user::{
    CreateUserRequest, CreateUserResponse, UserDetailResponse, UserListQuery, UserRow,
    user_sort_column, validate_create_user,
};
use crate::state::AppState;
use crate::utils::hash;
use crate::utils::store::{find_store_for_update, find_user, refresh_rating_summary};

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "Admin",
    operation_id = "getDashboardStats",
    summary = "Headline counts for the admin dashboard",
    responses(
        (status = 200, description = "Counts", body = DashboardStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_dashboard_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::ViewDashboard)?;

    let total_users = user::Entity::find().count(&state.db).await?;
    let total_stores = store::Entity::find().count(&state.db).await?;
    let total_ratings = rating::Entity::find().count(&state.db).await?;

    Ok(Json(DashboardStatsResponse {
        total_users,
        total_stores,
        total_ratings,
    }))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Admin",
    operation_id = "createUser",
    summary = "Create an account with any role",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = CreateUserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::CreateUser)?;
    validate_create_user(&payload)?;

    let role = payload.role.unwrap_or(Role::User);
    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(normalize_email(&payload.email)),
        password: Set(hash),
        address: Set(payload.address),
        role: Set(role.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    })?;

    info!(created_id = user.id, role = role.as_str(), "user created");
    Ok((StatusCode::CREATED, Json(CreateUserResponse { id: user.id })))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Admin",
    operation_id = "listUsers",
    summary = "List accounts with filters and sorting",
    params(UserListQuery),
    responses(
        (status = 200, description = "Accounts", body = [UserRow]),
        (status = 400, description = "Unknown sort field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::ListUsers)?;

    let sort_column = user_sort_column(query.sort_by.as_deref())?;
    let sort_order = query.sort_order.unwrap_or_default();

    let mut select = user::Entity::find();
    if let Some(name) = query.name.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(user::Column::Name, name.trim()));
    }
    if let Some(email) = query.email.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(user::Column::Email, email.trim()));
    }
    if let Some(address) = query.address.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(user::Column::Address, address.trim()));
    }
    if let Some(role) = query.role {
        select = select.filter(user::Column::Role.eq(role.as_str()));
    }

    let users = select
        .order_by(sort_column, sort_order.into())
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    let rows = users
        .into_iter()
        .map(|u| {
            let role = Role::parse(&u.role)
                .ok_or_else(|| AppError::Internal(format!("Unknown role '{}' on user row", u.role)))?;
            Ok(UserRow {
                id: u.id,
                name: u.name,
                email: u.email,
                address: u.address,
                role,
                created_at: u.created_at,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Admin",
    operation_id = "getUserDetails",
    summary = "Get one account's details",
    description = "For store owners the response additionally carries their store's name and \
        current average rating.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account details", body = UserDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, target_id = id))]
pub async fn get_user_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserDetailResponse>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::ListUsers)?;

    let user = find_user(&state.db, id).await?;
    let role = Role::parse(&user.role)
        .ok_or_else(|| AppError::Internal(format!("Unknown role '{}' on user row", user.role)))?;

    let (store_name, store_rating) = if role == Role::StoreOwner {
        let owned = store::Entity::find()
            .filter(store::Column::OwnerId.eq(user.id))
            .one(&state.db)
            .await?;
        match owned {
            Some(s) => (Some(s.name), Some(s.average_rating)),
            None => (None, None),
        }
    } else {
        (None, None)
    };

    Ok(Json(UserDetailResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        address: user.address,
        role,
        created_at: user.created_at,
        store_name,
        store_rating,
    }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Admin",
    operation_id = "deleteUser",
    summary = "Delete an account",
    description = "Cascades: the account's ratings are removed and every touched store's \
        aggregate is recomputed in the same transaction; stores the account owned stay, with \
        `owner_id` cleared. Admins cannot delete other admin accounts (self-deletion is allowed).",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, target_id = id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    // Role gate first, so a non-admin caller is turned away before any
    // lookup; the admin-target rule needs the target row and comes second.
    authz::check(auth_user.role, auth_user.user_id, Action::DeleteUser)?;

    let target = find_user(&state.db, id).await?;
    let target_role = Role::parse(&target.role)
        .ok_or_else(|| AppError::Internal(format!("Unknown role '{}' on user row", target.role)))?;
    authz::check_delete_user_target(auth_user.user_id, target_role, target.id)?;

    let txn = state.db.begin().await?;

    // Stores whose aggregates the cascade will invalidate. Locked up front so
    // concurrent rating submissions for them serialize behind this delete.
    // Sorted so overlapping deletions acquire locks in the same order.
    let mut touched: Vec<i32> = rating::Entity::find()
        .filter(rating::Column::UserId.eq(target.id))
        .select_only()
        .column(rating::Column::StoreId)
        .into_tuple()
        .all(&txn)
        .await?;
    touched.sort_unstable();
    for store_id in &touched {
        find_store_for_update(&txn, *store_id).await?;
    }

    rating::Entity::delete_many()
        .filter(rating::Column::UserId.eq(target.id))
        .exec(&txn)
        .await?;
    for store_id in &touched {
        refresh_rating_summary(&txn, *store_id).await?;
    }

    // Owned stores survive the owner; they just become unowned.
    store::Entity::update_many()
        .col_expr(store::Column::OwnerId, Expr::value(Option::<i32>::None))
        .filter(store::Column::OwnerId.eq(target.id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(target.id).exec(&txn).await?;
    txn.commit().await?;

    info!(deleted_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/stores",
    tag = "Admin",
    operation_id = "createStore",
    summary = "Create a store",
    description = "Optionally assigns an owner; assigning a plain `user` promotes them to \
        `store_owner`. A nonexistent owner is a validation error.",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = CreateStoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Store email already in use (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_store(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::CreateStore)?;
    validate_create_store(&payload)?;

    let txn = state.db.begin().await?;

    if let Some(owner_id) = payload.owner_id {
        let owner = user::Entity::find_by_id(owner_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Validation("Store owner not found".into()))?;
        if owner.role == Role::User.as_str() {
            let mut active: user::ActiveModel = owner.into();
            active.role = Set(Role::StoreOwner.as_str().to_string());
            active.update(&txn).await?;
        }
    }

    let new_store = store::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(normalize_email(&payload.email)),
        address: Set(payload.address),
        owner_id: Set(payload.owner_id),
        average_rating: Set(rust_decimal::Decimal::ZERO),
        total_ratings: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let store = new_store.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    })?;

    txn.commit().await?;

    info!(created_id = store.id, "store created");
    Ok((StatusCode::CREATED, Json(CreateStoreResponse { id: store.id })))
}

#[utoipa::path(
    get,
    path = "/stores",
    tag = "Admin",
    operation_id = "listAllStores",
    summary = "List stores with owner names, filters, and sorting",
    params(StoreListQuery),
    responses(
        (status = 200, description = "Stores", body = [AdminStoreRow]),
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
) -> Result<Json<Vec<AdminStoreRow>>, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::ListAllStores)?;

    let sort_column = store_sort_column(query.sort_by.as_deref())?;
    let sort_order = query.sort_order.unwrap_or_default();

    let mut select = store::Entity::find();
    if let Some(name) = query.name.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(store::Column::Name, name.trim()));
    }
    if let Some(email) = query.email.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(store::Column::Email, email.trim()));
    }
    if let Some(address) = query.address.as_deref().filter(|s| !s.trim().is_empty()) {
        select = select.filter(contains(store::Column::Address, address.trim()));
    }
    let stores = select
        .order_by(sort_column, sort_order.into())
        .order_by_asc(store::Column::Id)
        .all(&state.db)
        .await?;

    let owner_ids: Vec<i32> = stores.iter().filter_map(|s| s.owner_id).collect();
    let owner_names: HashMap<i32, String> = if owner_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(owner_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    let rows = stores
        .into_iter()
        .map(|s| AdminStoreRow {
            owner_name: s.owner_id.and_then(|id| owner_names.get(&id).cloned()),
            id: s.id,
            name: s.name,
            email: s.email,
            address: s.address,
            owner_id: s.owner_id,
            average_rating: s.average_rating,
            total_ratings: s.total_ratings,
            created_at: s.created_at,
        })
        .collect();

    Ok(Json(rows))
}

#[utoipa::path(
    delete,
    path = "/stores/{id}",
    tag = "Admin",
    operation_id = "deleteStore",
    summary = "Delete a store and all its ratings",
    params(("id" = i32, Path, description = "Store ID")),
    responses(
        (status = 204, description = "Store deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Store not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, store_id = id))]
pub async fn delete_store(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    authz::check(auth_user.role, auth_user.user_id, Action::DeleteStore)?;

    let txn = state.db.begin().await?;

    let store = find_store_for_update(&txn, id).await?;

    // Ratings never outlive their store.
    rating::Entity::delete_many()
        .filter(rating::Column::StoreId.eq(store.id))
        .exec(&txn)
        .await?;
    store::Entity::delete_by_id(store.id).exec(&txn).await?;

    txn.commit().await?;

    info!(deleted_id = id, "store deleted");
    Ok(StatusCode::NO_CONTENT)
}
