// storefront-common/src/rating.rs
//! Rating aggregation over a product's reviews.
//!
//! [`summarize`] is a pure function: it does not log, does no I/O and never
//! touches the store. Fetching the reviews and deciding what to do when that
//! fails belongs to the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::models::Review;
use crate::record_store::RecordId;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Aggregate statistics over one product's reviews.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub total_reviews: usize,
    /// Mean rating rounded half up to one decimal place; 0 when there are no reviews.
    pub average_rating: f64,
    /// Count per star value. Always holds all five keys.
    pub rating_breakdown: BTreeMap<u8, usize>,
}

impl RatingSummary {
    /// The summary of a product with no reviews.
    pub fn empty() -> Self {
        RatingSummary {
            total_reviews: 0,
            average_rating: 0.0,
            rating_breakdown: empty_breakdown(),
        }
    }
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self::empty()
    }
}

fn empty_breakdown() -> BTreeMap<u8, usize> {
    (MIN_RATING..=MAX_RATING).map(|star| (star, 0)).collect()
}

/// Check a rating against the 1-5 star range.
pub fn validate_rating(review_id: Option<RecordId>, rating: i64) -> Result<u8, ValidationError> {
    if (MIN_RATING as i64..=MAX_RATING as i64).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(ValidationError::RatingOutOfRange { review_id, rating })
    }
}

/// Summarize the reviews of a single product.
///
/// The caller is expected to pass reviews for one product only; nothing is
/// filtered here. A rating outside 1-5 fails the whole call.
pub fn summarize(reviews: &[Review]) -> Result<RatingSummary, ValidationError> {
    if reviews.is_empty() {
        return Ok(RatingSummary::empty());
    }

    let mut breakdown = empty_breakdown();
    let mut sum: u64 = 0;

    for review in reviews {
        let star = validate_rating(Some(review.id), i64::from(review.rating))?;
        sum += u64::from(star);
        *breakdown.entry(star).or_insert(0) += 1;
    }

    let total = reviews.len();
    Ok(RatingSummary {
        total_reviews: total,
        average_rating: rounded_mean(sum, total as u64),
        rating_breakdown: breakdown,
    })
}

/// `sum / count` rounded half up to one decimal place.
///
/// Works in whole tenths so that e.g. 23/20 lands on 1.2 instead of
/// falling to 1.1 through binary floating-point error.
fn rounded_mean(sum: u64, count: u64) -> f64 {
    let tenths = (20 * sum + count) / (2 * count);
    tenths as f64 / 10.0
}
