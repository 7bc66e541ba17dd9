// storefront-server/src/plugins/cart/operations.rs
use serde_json::{json, Value};
use storefront_common::models::{CartItemUpdate, NewCartItem};
use storefront_common::{CartService, PluginResult};

use crate::plugins::{id_param, parse_params};

pub fn list_cart(service: &CartService, _params: &Value) -> PluginResult {
    let items = service.get_cart_items()?;
    let subtotal: f64 = items
        .iter()
        .map(|item| item.product.discount_price.unwrap_or(item.product.price) * f64::from(item.quantity))
        .sum();

    Ok(json!({
        "results": items,
        "count": items.len(),
        "subtotal": subtotal
    }))
}

pub fn add_to_cart(service: &CartService, params: &Value) -> PluginResult {
    let item: NewCartItem = parse_params(params)?;
    Ok(serde_json::to_value(service.add_to_cart(&item)?)?)
}

pub fn update_cart_item(service: &CartService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    let update: CartItemUpdate = parse_params(params)?;
    Ok(serde_json::to_value(service.update_cart_item(id, update)?)?)
}

pub fn remove_from_cart(service: &CartService, params: &Value) -> PluginResult {
    let id = id_param(params, "id")?;
    Ok(json!({ "success": service.remove_from_cart(id)?, "id": id }))
}

pub fn clear_cart(service: &CartService, _params: &Value) -> PluginResult {
    Ok(json!({ "success": service.clear_cart()? }))
}

pub fn list_wishlist(service: &CartService, _params: &Value) -> PluginResult {
    let products = service.get_wishlist_items()?;
    Ok(json!({
        "results": products,
        "count": products.len()
    }))
}

pub fn add_to_wishlist(service: &CartService, params: &Value) -> PluginResult {
    let product_id = id_param(params, "productId")?;
    Ok(serde_json::to_value(service.add_to_wishlist(product_id)?)?)
}

pub fn remove_from_wishlist(service: &CartService, params: &Value) -> PluginResult {
    let product_id = id_param(params, "productId")?;
    Ok(json!({ "success": service.remove_from_wishlist(product_id)?, "productId": product_id }))
}
