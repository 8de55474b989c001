use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::authz::Role;
use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::{
    SortOrder, validate_address, validate_email, validate_name, validate_password,
};

/// Request body for admin user creation. Unlike self-registration, any role
/// may be assigned.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    /// Full name (20-60 characters).
    #[schema(example = "Jonathan Maxwell Fitzgerald")]
    pub name: String,
    #[schema(example = "jon@example.com")]
    pub email: String,
    /// Password (8-16 chars, at least one uppercase and one special character).
    pub password: String,
    pub address: Option<String>,
    /// Defaults to `user` when omitted.
    pub role: Option<Role>,
}

pub fn validate_create_user(payload: &CreateUserRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_address(payload.address.as_deref())?;
    Ok(())
}

/// Query parameters for the admin user listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    /// Case-insensitive substring match on name.
    pub name: Option<String>,
    /// Case-insensitive substring match on email.
    pub email: Option<String>,
    /// Case-insensitive substring match on address.
    pub address: Option<String>,
    /// Exact role match.
    pub role: Option<Role>,
    /// One of: name, email, address, role, created_at. Default: name.
    pub sort_by: Option<String>,
    /// asc or desc. Default: asc.
    pub sort_order: Option<SortOrder>,
}

/// Resolve `sort_by` against the allow-list before any query is built;
/// unknown fields never reach the database.
pub fn user_sort_column(sort_by: Option<&str>) -> Result<user::Column, AppError> {
    match sort_by.unwrap_or("name") {
        "name" => Ok(user::Column::Name),
        "email" => Ok(user::Column::Email),
        "address" => Ok(user::Column::Address),
        "role" => Ok(user::Column::Role),
        "created_at" => Ok(user::Column::CreatedAt),
        _ => Err(AppError::Validation(
            "sort_by must be one of: name, email, address, role, created_at".into(),
        )),
    }
}

/// One row of the admin user listing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Full user details for the admin view. Store owners additionally carry
/// their store's name and current average rating.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserDetailResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>, example = 4.2)]
    pub store_rating: Option<Decimal>,
}

/// Response for user creation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateUserResponse {
    #[schema(example = 42)]
    pub id: i32,
}
