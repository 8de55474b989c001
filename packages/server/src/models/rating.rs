use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for submitting (or replacing) the caller's rating of a store.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitRatingRequest {
    #[schema(example = 17)]
    pub store_id: i32,
    /// 1 to 5.
    #[schema(example = 4)]
    pub value: i32,
}

pub fn validate_submit_rating(payload: &SubmitRatingRequest) -> Result<(), AppError> {
    if !(1..=5).contains(&payload.value) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

/// Response for a rating mutation: the store's freshly committed aggregate,
/// recomputed in the same transaction as the write.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RatingSummaryResponse {
    pub store_id: i32,
    #[schema(value_type = f64, example = 4.2)]
    pub average_rating: Decimal,
    pub total_ratings: i32,
}

/// The caller's own rating for one store.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MyRatingResponse {
    pub store_id: i32,
    /// Null when the caller has not rated this store.
    pub value: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}
