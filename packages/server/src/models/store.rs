use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::store;
use crate::error::AppError;
use crate::models::shared::{SortOrder, validate_address, validate_email};

/// Request body for admin store creation.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStoreRequest {
    /// Store name (1-255 characters).
    #[schema(example = "Fresh Market Grocery Store")]
    pub name: String,
    #[schema(example = "contact@freshmarket.com")]
    pub email: String,
    pub address: String,
    /// Optional owner. Assigning one promotes a plain `user` to `store_owner`.
    pub owner_id: Option<i32>,
}

pub fn validate_create_store(payload: &CreateStoreRequest) -> Result<(), AppError> {
    let name = payload.name.trim();
    if name.is_empty() || name.chars().count() > 255 {
        return Err(AppError::Validation(
            "Store name is required and must not exceed 255 characters".into(),
        ));
    }
    validate_email(&payload.email)?;
    validate_address(Some(&payload.address))?;
    Ok(())
}

/// Query parameters for store listings (both the admin view and the
/// user-facing annotated view).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct StoreListQuery {
    /// Case-insensitive substring match on name.
    pub name: Option<String>,
    /// Case-insensitive substring match on email (admin listing only).
    pub email: Option<String>,
    /// Case-insensitive substring match on address.
    pub address: Option<String>,
    /// One of: name, email, address, average_rating, total_ratings, created_at.
    /// Default: name.
    pub sort_by: Option<String>,
    /// asc or desc. Default: asc.
    pub sort_order: Option<SortOrder>,
}

/// Resolve `sort_by` against the allow-list before any query is built.
pub fn store_sort_column(sort_by: Option<&str>) -> Result<store::Column, AppError> {
    match sort_by.unwrap_or("name") {
        "name" => Ok(store::Column::Name),
        "email" => Ok(store::Column::Email),
        "address" => Ok(store::Column::Address),
        "average_rating" => Ok(store::Column::AverageRating),
        "total_ratings" => Ok(store::Column::TotalRatings),
        "created_at" => Ok(store::Column::CreatedAt),
        _ => Err(AppError::Validation(
            "sort_by must be one of: name, email, address, average_rating, total_ratings, created_at"
                .into(),
        )),
    }
}

/// One row of the user-facing store listing: public fields, the all-users
/// aggregates, and the caller's own rating when they have one.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StoreRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    #[schema(value_type = f64, example = 4.2)]
    pub average_rating: Decimal,
    pub total_ratings: i32,
    /// The caller's own rating for this store; null if they have not rated it.
    pub my_rating: Option<i32>,
}

/// One row of the admin store listing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminStoreRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<i32>,
    /// Owner's display name; null for unowned stores.
    pub owner_name: Option<String>,
    #[schema(value_type = f64, example = 4.2)]
    pub average_rating: Decimal,
    pub total_ratings: i32,
    pub created_at: DateTime<Utc>,
}

/// Public details of a single store.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StoreDetailResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_name: Option<String>,
    #[schema(value_type = f64, example = 4.2)]
    pub average_rating: Decimal,
    pub total_ratings: i32,
    pub created_at: DateTime<Utc>,
}

/// One rating as shown to the store's owner: who rated, and what.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StoreRatingRow {
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub value: i32,
    pub created_at: DateTime<Utc>,
}

/// The owner dashboard: the store plus every rating it has received.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MyStoreResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    #[schema(value_type = f64, example = 4.2)]
    pub average_rating: Decimal,
    pub total_ratings: i32,
    pub ratings: Vec<StoreRatingRow>,
}

/// Response for store creation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateStoreResponse {
    #[schema(example = 17)]
    pub id: i32,
}
