// storefront-server/src/plugin_registry.rs

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use storefront_common::{PluginResult, StorefrontPlugin};
use tracing::info;

/// Registry that manages all available plugins
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, Arc<dyn StorefrontPlugin>>>,
}

impl PluginRegistry {
    /// Create a new plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin with the registry
    pub fn register_plugin(&self, plugin: Arc<dyn StorefrontPlugin>) -> Result<(), String> {
        let name = plugin.name().to_string();
        let mut plugins = self
            .plugins
            .write()
            .map_err(|_| "Plugin registry lock poisoned".to_string())?;

        if plugins.contains_key(&name) {
            return Err(format!("Plugin '{}' is already registered", name));
        }

        info!("Registered plugin: {}", name);
        plugins.insert(name, plugin);
        Ok(())
    }

    pub fn register_all(&self, plugins: Vec<Arc<dyn StorefrontPlugin>>) -> Result<(), String> {
        plugins.into_iter().try_for_each(|plugin| self.register_plugin(plugin))
    }

    /// Get a plugin by name
    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn StorefrontPlugin>> {
        // A poisoned lock still holds a usable map; plugins are never mutated after insert.
        let plugins = self.plugins.read().unwrap_or_else(|e| e.into_inner());
        plugins.get(name).cloned()
    }

    /// Get all registered plugins, ordered by name
    pub fn get_all_plugins(&self) -> Vec<Arc<dyn StorefrontPlugin>> {
        let plugins = self.plugins.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<_> = plugins.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Execute a plugin operation
    pub fn execute_plugin(&self, name: &str, operation: &str, params: &Value) -> PluginResult {
        if let Some(plugin) = self.get_plugin(name) {
            plugin.execute(operation, params)
        } else {
            Err(format!("Plugin '{}' not found", name).into())
        }
    }
}
