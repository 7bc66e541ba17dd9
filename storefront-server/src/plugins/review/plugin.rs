// storefront-server/src/plugins/review/plugin.rs
use crate::plugins::review::operations;
use crate::plugins::to_text;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;
use storefront_common::{
    ContentItem, PluginResult, PluginType, RecordStore, ReviewService, StorefrontPlugin, ToolAnnotations,
};

const OPERATIONS: &[&str] = &["LIST_REVIEWS", "ADD_REVIEW", "UPDATE_REVIEW", "DELETE_REVIEW", "REVIEW_SUMMARY"];

pub struct ReviewPlugin {
    name: String,
    description: String,
    service: ReviewService,
}

impl ReviewPlugin {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        ReviewPlugin {
            name: "store_review".to_string(),
            description: "Product reviews and rating summaries".to_string(),
            service: ReviewService::new(store),
        }
    }
}

impl StorefrontPlugin for ReviewPlugin {
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
                "productId": {
                    "type": "integer",
                    "description": "Product for LIST_REVIEWS, ADD_REVIEW and REVIEW_SUMMARY"
                },
                "id": {
                    "type": "integer",
                    "description": "Review ID for UPDATE_REVIEW and DELETE_REVIEW"
                },
                "userName": { "type": "string", "description": "Author name" },
                "rating": { "type": "integer", "minimum": 1, "maximum": 5, "description": "Star rating" },
                "comment": { "type": "string", "description": "Review text" }
            },
            "required": ["operation"]
        })
    }

    fn execute(&self, operation: &str, params: &Value) -> PluginResult {
        match operation {
            "LIST_REVIEWS" => operations::list_reviews(&self.service, params),
            "ADD_REVIEW" => operations::add_review(&self.service, params),
            "UPDATE_REVIEW" => operations::update_review(&self.service, params),
            "DELETE_REVIEW" => operations::delete_review(&self.service, params),
            "REVIEW_SUMMARY" => operations::review_summary(&self.service, params),
            _ => Err(format!("Unsupported operation: {}", operation).into()),
        }
    }

    fn get_resource_templates(&self) -> Vec<(String, String, Option<String>)> {
        vec![(
            "review_summary".to_string(),
            "summary/{productId}".to_string(),
            Some("Rating summary for one product".to_string()),
        )]
    }

    fn read_resource(&self, resource_suffix: &str) -> Result<ContentItem, Box<dyn Error + Send + Sync>> {
        let product_id = resource_suffix
            .strip_prefix("summary/")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| format!("Unknown review resource '{}'", resource_suffix))?;

        let summary = operations::summary_or_empty(&self.service, product_id);
        Ok(ContentItem::text(to_text(&summary)?))
    }

    fn get_tool_annotations(&self) -> Option<ToolAnnotations> {
        Some(ToolAnnotations {
            title: Some("Product reviews".to_string()),
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(false),
        })
    }
}
