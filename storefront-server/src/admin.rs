// storefront-server/src/admin.rs
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::AppState;

// Get server stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime_secs = state.startup_time.elapsed().as_secs();

    let uptime_formatted = format!(
        "{}d {}h {}m {}s",
        uptime_secs / 86400,
        (uptime_secs % 86400) / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    Json(json!({
        "uptime_secs": uptime_secs,
        "uptime_formatted": uptime_formatted,
        "started_at": state.started_at.to_rfc3339(),
        "request_count": state.request_count.load(Ordering::SeqCst),
        "plugin_count": state.registry.get_all_plugins().len(),
        "data_path": state.data_path.display().to_string()
    }))
}

// Get plugins list
pub async fn get_plugins(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let plugin_info: Vec<serde_json::Value> = state
        .registry
        .get_all_plugins()
        .iter()
        .map(|plugin| {
            json!({
                "name": plugin.name(),
                "description": plugin.description(),
                "category": plugin.category(),
                "type": format!("{:?}", plugin.plugin_type()),
                "operations": plugin.supported_operations(),
                "resources": plugin.get_resources().into_iter().map(|(_, suffix, _)| suffix).collect::<Vec<_>>(),
                "resource_templates": plugin
                    .get_resource_templates()
                    .into_iter()
                    .map(|(_, suffix, _)| suffix)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    Json(json!({ "plugins": plugin_info }))
}
