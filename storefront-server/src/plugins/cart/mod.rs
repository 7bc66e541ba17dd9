// storefront-server/src/plugins/cart/mod.rs
mod operations;
mod plugin;

pub use plugin::CartPlugin;
use std::sync::Arc;
use storefront_common::{RecordStore, StorefrontPlugin};

/// Create a new Cart plugin
pub fn create_plugin(store: Arc<dyn RecordStore>) -> Arc<dyn StorefrontPlugin> {
    Arc::new(CartPlugin::new(store))
}
