// storefront-server/src/plugins/product/plugin.rs
use crate::plugins::product::operations;
use crate::plugins::to_text;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;
use storefront_common::models::{ProductFilters, SortBy};
use storefront_common::{
    ContentItem, PluginResult, PluginType, ProductService, RecordStore, StorefrontPlugin, ToolAnnotations,
};

const OPERATIONS: &[&str] = &[
    "SEARCH_PRODUCTS",
    "GET_PRODUCT",
    "LIST_PRODUCTS",
    "CREATE_PRODUCT",
    "UPDATE_PRODUCT",
    "DELETE_PRODUCT",
];

pub struct ProductPlugin {
    name: String,
    description: String,
    service: ProductService,
}

impl ProductPlugin {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        ProductPlugin {
            name: "store_product".to_string(),
            description: "Product catalog search and management".to_string(),
            service: ProductService::new(store),
        }
    }
}

impl StorefrontPlugin for ProductPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> &str {
        "commerce"
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::Core
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
                    "description": "Product ID for GET, UPDATE and DELETE"
                },
                "search": {
                    "type": "string",
                    "description": "Case-insensitive name search for SEARCH_PRODUCTS"
                },
                "categories": { "type": "array", "items": { "type": "string" } },
                "brands": { "type": "array", "items": { "type": "string" } },
                "sortBy": {
                    "type": "string",
                    "enum": ["featured", "price-low", "price-high", "newest"]
                },
                "limit": { "type": "integer", "minimum": 1 },
                "name": { "type": "string" },
                "brand": { "type": "string" },
                "price": { "type": "number" },
                "discountPrice": { "type": "number" },
                "images": { "type": "array", "items": { "type": "string" } },
                "sizes": { "type": "array", "items": { "type": "string" } },
                "colors": { "type": "array", "items": { "type": "string" } },
                "category": { "type": "string" },
                "subcategory": { "type": "string" },
                "inStock": { "type": "boolean" },
                "description": { "type": "string" }
            },
            "required": ["operation"]
        })
    }

    fn execute(&self, operation: &str, params: &Value) -> PluginResult {
        match operation {
            "SEARCH_PRODUCTS" => operations::search_products(&self.service, params),
            "GET_PRODUCT" => operations::get_product(&self.service, params),
            "LIST_PRODUCTS" => operations::list_products(&self.service, params),
            "CREATE_PRODUCT" => operations::create_product(&self.service, params),
            "UPDATE_PRODUCT" => operations::update_product(&self.service, params),
            "DELETE_PRODUCT" => operations::delete_product(&self.service, params),
            _ => Err(format!("Unsupported operation: {}", operation).into()),
        }
    }

    fn get_resources(&self) -> Vec<(String, String, Option<String>)> {
        vec![(
            "product_catalog".to_string(),
            "catalog".to_string(),
            Some("Full product catalog in featured order".to_string()),
        )]
    }

    fn read_resource(&self, resource_suffix: &str) -> Result<ContentItem, Box<dyn Error + Send + Sync>> {
        match resource_suffix {
            "catalog" => {
                let products = self
                    .service
                    .get_products(&ProductFilters::default(), SortBy::Featured, None)?;
                Ok(ContentItem::text(to_text(&products)?))
            }
            _ => Err(format!("Unknown product resource '{}'", resource_suffix).into()),
        }
    }

    fn get_tool_annotations(&self) -> Option<ToolAnnotations> {
        Some(ToolAnnotations {
            title: Some("Product catalog".to_string()),
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(false),
        })
    }
}
