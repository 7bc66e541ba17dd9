// storefront-server/src/plugins/review/mod.rs
mod operations;
mod plugin;

pub use plugin::ReviewPlugin;
use std::sync::Arc;
use storefront_common::{RecordStore, StorefrontPlugin};

/// Create a new Review plugin
pub fn create_plugin(store: Arc<dyn RecordStore>) -> Arc<dyn StorefrontPlugin> {
    Arc::new(ReviewPlugin::new(store))
}
