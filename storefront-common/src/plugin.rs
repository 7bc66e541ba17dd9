// storefront-common/src/plugin.rs
use serde_json::Value;
use std::error::Error;
use crate::{ContentItem, ToolAnnotations};

// Plugin type to distinguish between core and extension plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginType {
    Core,      // Built-in store functionality
    Extension, // Add-on functionality
}

/// Trait that defines the interface for storefront plugins
pub trait StorefrontPlugin: Send + Sync {
    /// Get the unique name of this plugin
    fn name(&self) -> &str;

    /// Get plugin description
    fn description(&self) -> &str;

    /// Get the category this plugin belongs to
    fn category(&self) -> &str;

    /// Get the type of this plugin
    fn plugin_type(&self) -> PluginType {
        PluginType::Extension
    }

    /// Get list of operations this plugin supports
    fn supported_operations(&self) -> Vec<String>;

    /// Get the input schema for `tools/call` on this plugin
    fn input_schema(&self) -> Value;

    /// Execute an operation on this plugin
    fn execute(&self, operation: &str, params: &Value) -> PluginResult;

    /// Get resources this plugin provides (name, uri_suffix, description).
    /// Every listed suffix must be readable as-is.
    fn get_resources(&self) -> Vec<(String, String, Option<String>)> {
        Vec::new()
    }

    /// Get parameterized resources (name, uri_suffix_template, description),
    /// with placeholders such as `{productId}` in the suffix.
    fn get_resource_templates(&self) -> Vec<(String, String, Option<String>)> {
        Vec::new()
    }

    /// Read a resource provided by this plugin.
    /// The `resource_suffix` is the part of the URI after the plugin name,
    /// e.g. `summary/12` for `storefront://shop/resources/store_review/summary/12`.
    fn read_resource(&self, resource_suffix: &str) -> Result<ContentItem, Box<dyn Error + Send + Sync>> {
        Err(format!("Plugin '{}' does not support reading resource '{}'", self.name(), resource_suffix).into())
    }

    /// Annotations for this plugin when listed as a tool.
    fn get_tool_annotations(&self) -> Option<ToolAnnotations> {
        None
    }
}

/// Result type for plugin operations (used by `execute`)
pub type PluginResult = Result<Value, Box<dyn Error + Send + Sync>>;
