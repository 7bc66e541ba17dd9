// storefront-server/src/plugins/mod.rs

pub mod cart;
pub mod product;
pub mod review;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;
use storefront_common::{RecordId, RecordStore, StorefrontPlugin};

/// Create every store plugin over the same record store
pub fn create_plugins(store: Arc<dyn RecordStore>) -> Vec<Arc<dyn StorefrontPlugin>> {
    vec![
        product::create_plugin(store.clone()),
        review::create_plugin(store.clone()),
        cart::create_plugin(store),
    ]
}

/// Read an id argument. Accepts a JSON integer or a numeric string.
pub(crate) fn id_param(params: &Value, key: &str) -> Result<RecordId, Box<dyn Error + Send + Sync>> {
    let value = params.get(key);
    value
        .and_then(Value::as_i64)
        .or_else(|| value.and_then(Value::as_str).and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| format!("Missing or invalid '{}' parameter", key).into())
}

/// Deserialize the tool arguments into an input model. Unknown keys such as
/// `operation` are ignored.
pub(crate) fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, Box<dyn Error + Send + Sync>> {
    serde_json::from_value(params.clone()).map_err(|e| format!("Invalid parameters: {}", e).into())
}

/// Render a value as pretty JSON for a text resource.
pub(crate) fn to_text(value: &impl serde::Serialize) -> Result<String, Box<dyn Error + Send + Sync>> {
    Ok(serde_json::to_string_pretty(value)?)
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_param_accepts_numbers_and_strings() {
        assert_eq!(id_param(&json!({"id": 7}), "id").unwrap(), 7);
        assert_eq!(id_param(&json!({"productId": " 12 "}), "productId").unwrap(), 12);
        assert!(id_param(&json!({"id": "abc"}), "id").is_err());
        assert!(id_param(&json!({}), "id").is_err());
    }
}
