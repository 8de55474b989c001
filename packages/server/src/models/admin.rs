use serde::Serialize;

/// Headline counts for the admin dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardStatsResponse {
    #[schema(example = 120)]
    pub total_users: u64,
    #[schema(example = 34)]
    pub total_stores: u64,
    #[schema(example = 512)]
    pub total_ratings: u64,
}
