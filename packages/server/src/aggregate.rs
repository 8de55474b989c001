//! Rating aggregation.
//!
//! The store row's `average_rating`/`total_ratings` columns are a cache over
//! the rating table. Every rating mutation recomputes them from the full
//! rating set inside the same transaction (see `utils::store`), so a
//! committed write is never observable with a stale aggregate. The original
//! system did this with database triggers; here it is an explicit function so
//! the arithmetic is unit-testable.

use rust_decimal::{Decimal, RoundingStrategy};

/// Recomputed aggregate for one store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingSummary {
    /// Mean of all rating values, one fractional digit, 0.0 when empty.
    pub average: Decimal,
    pub total: i32,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average: Decimal::ZERO,
            total: 0,
        }
    }
}

/// Compute the summary for a store's current rating set.
///
/// Rounds half away from zero to match DECIMAL(2,1) column semantics, and
/// yields an explicit 0.0 (not NULL) for a store with no ratings.
pub fn summarize(values: &[i32]) -> RatingSummary {
    if values.is_empty() {
        return RatingSummary::empty();
    }

    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let average = (Decimal::from(sum) / Decimal::from(values.len()))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    RatingSummary {
        average,
        total: values.len() as i32,
    }
}
