// storefront-server/src/plugins/product/mod.rs
mod operations;
mod plugin;

pub use plugin::ProductPlugin;
use std::sync::Arc;
use storefront_common::{RecordStore, StorefrontPlugin};

/// Create a new Product plugin
pub fn create_plugin(store: Arc<dyn RecordStore>) -> Arc<dyn StorefrontPlugin> {
    Arc::new(ProductPlugin::new(store))
}
