// storefront-server/src/plugins/cart/plugin.rs
use crate::plugins::cart::operations;
use crate::plugins::to_text;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;
use storefront_common::{CartService, ContentItem, PluginResult, RecordStore, StorefrontPlugin, ToolAnnotations};

const OPERATIONS: &[&str] = &[
    "LIST_CART",
    "ADD_TO_CART",
    "UPDATE_CART_ITEM",
    "REMOVE_FROM_CART",
    "CLEAR_CART",
    "LIST_WISHLIST",
    "ADD_TO_WISHLIST",
    "REMOVE_FROM_WISHLIST",
];

pub struct CartPlugin {
    name: String,
    description: String,
    service: CartService,
}

impl CartPlugin {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CartPlugin {
            name: "store_cart".to_string(),
            description: "Shopping cart and wishlist".to_string(),
            service: CartService::new(store),
        }
    }
}

impl StorefrontPlugin for CartPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> &str {
        "commerce"
    }

    fn supported_operations(&self) -> Vec<String> {
        OPERATIONS.iter().map(|op| op.to_string()).collect()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": OPERATIONS,
                    "description": "Operation to perform"
                },
                "id": {
                    "type": "integer",
                    "description": "Cart item ID for UPDATE_CART_ITEM and REMOVE_FROM_CART"
                },
                "productId": {
                    "type": "integer",
                    "description": "Product for ADD_TO_CART and the wishlist operations"
                },
                "quantity": { "type": "integer", "minimum": 1 },
                "size": { "type": "string" },
                "color": { "type": "string" }
            },
            "required": ["operation"]
        })
    }

    fn execute(&self, operation: &str, params: &Value) -> PluginResult {
        match operation {
            "LIST_CART" => operations::list_cart(&self.service, params),
            "ADD_TO_CART" => operations::add_to_cart(&self.service, params),
            "UPDATE_CART_ITEM" => operations::update_cart_item(&self.service, params),
            "REMOVE_FROM_CART" => operations::remove_from_cart(&self.service, params),
            "CLEAR_CART" => operations::clear_cart(&self.service, params),
            "LIST_WISHLIST" => operations::list_wishlist(&self.service, params),
            "ADD_TO_WISHLIST" => operations::add_to_wishlist(&self.service, params),
            "REMOVE_FROM_WISHLIST" => operations::remove_from_wishlist(&self.service, params),
            _ => Err(format!("Unsupported operation: {}", operation).into()),
        }
    }

    fn get_resources(&self) -> Vec<(String, String, Option<String>)> {
        vec![
            (
                "cart".to_string(),
                "cart".to_string(),
                Some("Current cart lines with product details".to_string()),
            ),
            (
                "wishlist".to_string(),
                "wishlist".to_string(),
                Some("Saved products".to_string()),
            ),
        ]
    }

    fn read_resource(&self, resource_suffix: &str) -> Result<ContentItem, Box<dyn Error + Send + Sync>> {
        let text = match resource_suffix {
            "cart" => to_text(&self.service.get_cart_items()?)?,
            "wishlist" => to_text(&self.service.get_wishlist_items()?)?,
            _ => return Err(format!("Unknown cart resource '{}'", resource_suffix).into()),
        };
        Ok(ContentItem::text(text))
    }

    fn get_tool_annotations(&self) -> Option<ToolAnnotations> {
        Some(ToolAnnotations {
            title: Some("Cart and wishlist".to_string()),
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(false),
        })
    }
}
