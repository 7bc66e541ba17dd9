// storefront-server/src/plugins/review/operations.rs
use serde_json::{json, Value};
use storefront_common::models::{NewReview, ReviewUpdate};
use storefront_common::{PluginResult, RatingSummary, RecordId, ReviewService};
use tracing::{info, warn};

use crate::plugins::{id_param, parse_params};

pub fn list_reviews(service: &ReviewService, params: &Value) -> PluginResult {
    let product_id = id_param(params, "productId")?;
    let reviews = service.get_reviews(product_id)?;
    info!("Listed {} reviews for product {}", reviews.len(), product_id);

    Ok(json!({
        "results": reviews,
        "count": reviews.len(),
        "productId": product_id
    }))
}

pub fn add_review(service: &ReviewService, params: &Value) -> PluginResult {
    let review: NewReview = parse_params(params)?;
    Ok(serde_json::to_value(service.add_review(&review)?)?)
}

pub fn update_review(service: &ReviewService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    let update: ReviewUpdate = parse_params(params)?;
    Ok(serde_json::to_value(service.update_review(id, &update)?)?)
}

pub fn delete_review(service: &ReviewService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    let deleted = service.delete_review(id)?;
    Ok(json!({ "success": deleted, "id": id }))
}

pub fn review_summary(service: &ReviewService, params: &Value) -> PluginResult {
    let product_id = id_param(params, "productId")?;
    Ok(serde_json::to_value(summary_or_empty(service, product_id))?)
}

/// Summary for the product page. Any failure to fetch or summarize degrades
/// to the zeroed summary so the page still renders.
pub fn summary_or_empty(service: &ReviewService, product_id: RecordId) -> RatingSummary {
    match service.get_reviews_summary(product_id) {
        Ok(summary) => summary,
        Err(e) => {
            warn!("Falling back to empty review summary for product {}: {}", product_id, e);
            RatingSummary::empty()
        }
    }
}
