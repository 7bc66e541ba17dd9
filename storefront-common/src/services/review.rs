// storefront-common/src/services/review.rs
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::{all_deleted, first_successful, id_of, integer, into_record, now_rfc3339, text, timestamp};
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::models::{NewReview, Review, ReviewUpdate};
use crate::rating::{self, RatingSummary};
use crate::record_store::{Condition, FetchParams, Operator, Record, RecordId, RecordStore, SortDirection};

const TABLE: &str = "review";
const FIELDS: &[&str] = &["Name", "product", "user_name", "rating", "comment", "created_at", "updated_at"];

pub struct ReviewService {
    store: Arc<dyn RecordStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        ReviewService { store }
    }

    /// All reviews for a product, newest first.
    pub fn get_reviews(&self, product_id: RecordId) -> ServiceResult<Vec<Review>> {
        let params = FetchParams::new()
            .fields(FIELDS)
            .filter(Condition::new("product", Operator::EqualTo, vec![json!(product_id)]))
            .order_by("created_at", SortDirection::Desc);

        self.store
            .fetch_records(TABLE, &params)?
            .iter()
            .map(|record| review_from_record(record, Some(product_id)))
            .collect()
    }

    pub fn add_review(&self, review: &NewReview) -> ServiceResult<Review> {
        let rating = rating::validate_rating(None, review.rating)?;
        if review.user_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("userName").into());
        }

        let now = now_rfc3339();
        let record = into_record(json!({
            "Name": format!("Review by {}", review.user_name),
            "product": review.product_id,
            "user_name": review.user_name,
            "rating": rating,
            "comment": review.comment,
            "created_at": now.clone(),
            "updated_at": now,
        }));

        let outcomes = self.store.create_records(TABLE, vec![record])?;
        let created = first_successful(TABLE, "create", outcomes)?;
        info!("Added review {:?} for product {}", created.get("Id"), review.product_id);
        review_from_record(&created, Some(review.product_id))
    }

    pub fn update_review(&self, id: RecordId, update: &ReviewUpdate) -> ServiceResult<Review> {
        let rating = rating::validate_rating(Some(id), update.rating)?;
        if update.user_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("userName").into());
        }

        let record = into_record(json!({
            "Id": id,
            "user_name": update.user_name,
            "rating": rating,
            "comment": update.comment,
            "updated_at": now_rfc3339(),
        }));

        let outcomes = self.store.update_records(TABLE, vec![record])?;
        let updated = first_successful(TABLE, "update", outcomes)?;
        review_from_record(&updated, None)
    }

    /// Returns false when no review with that id existed.
    pub fn delete_review(&self, id: RecordId) -> ServiceResult<bool> {
        let outcomes = self.store.delete_records(TABLE, &[id])?;
        Ok(all_deleted(TABLE, &outcomes))
    }

    /// Fetch a product's reviews and summarize them.
    pub fn get_reviews_summary(&self, product_id: RecordId) -> ServiceResult<RatingSummary> {
        let reviews = self.get_reviews(product_id)?;
        Ok(rating::summarize(&reviews)?)
    }
}

fn review_from_record(record: &Record, product_id: Option<RecordId>) -> ServiceResult<Review> {
    let id = id_of(TABLE, record)?;
    let product_id = match product_id {
        Some(product_id) => product_id,
        None => integer(TABLE, record, "product")?,
    };
    let raw_rating = integer(TABLE, record, "rating")?;
    let rating = u8::try_from(raw_rating)
        .map_err(|_| ServiceError::malformed(TABLE, format!("rating {} does not fit a star value", raw_rating)))?;

    Ok(Review {
        id,
        product_id,
        user_name: text(record, "user_name"),
        rating,
        comment: text(record, "comment"),
        created_at: timestamp(TABLE, record, "created_at")?,
        updated_at: timestamp(TABLE, record, "updated_at")?,
    })
}
