// storefront-server/src/plugins/product/operations.rs
use serde_json::{json, Value};
use storefront_common::models::{ProductFilters, ProductInput, SortBy};
use storefront_common::{PluginResult, ProductService};
use tracing::info;

use crate::plugins::{id_param, parse_params};

const DEFAULT_LIMIT: usize = 50;

pub fn search_products(service: &ProductService, params: &Value) -> PluginResult {
    let filters: ProductFilters = parse_params(params)?;
    let sort_by = match params.get("sortBy").and_then(Value::as_str) {
        Some(s) => s.parse::<SortBy>()?,
        None => SortBy::default(),
    };
    let limit = params
        .get("limit")
        .and_then(Value::as_u64)
        .map(|l| l as usize)
        .unwrap_or(DEFAULT_LIMIT);

    let products = service.get_products(&filters, sort_by, Some(limit))?;
    info!("Product search returned {} results (sort {})", products.len(), sort_by);

    Ok(json!({
        "results": products,
        "count": products.len(),
        "sortBy": sort_by.as_str()
    }))
}

pub fn get_product(service: &ProductService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    match service.get_product_by_id(id)? {
        Some(product) => Ok(serde_json::to_value(product)?),
        None => Err(format!("Product not found: {}", id).into()),
    }
}

pub fn list_products(service: &ProductService, _params: &Value) -> PluginResult {
    let products = service.get_products(&ProductFilters::default(), SortBy::Featured, None)?;
    Ok(json!({
        "results": products,
        "count": products.len()
    }))
}

pub fn create_product(service: &ProductService, params: &Value) -> PluginResult {
    let input: ProductInput = parse_params(params)?;
    let created = service.create_product(&input)?;
    Ok(json!({ "results": created, "count": created.len() }))
}

pub fn update_product(service: &ProductService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    let input: ProductInput = parse_params(params)?;
    let updated = service.update_product(id, &input)?;
    Ok(json!({ "results": updated, "count": updated.len() }))
}

pub fn delete_product(service: &ProductService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    let deleted = service.delete_product(id)?;
    Ok(json!({ "success": deleted, "id": id }))
}
