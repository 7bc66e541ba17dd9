// storefront-server/src/main.rs

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::{
    error::Error,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};
use storefront_common::{CapabilityDescription, DiscoveryResponse, JsonFileStore, Provider, RecordStore};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

mod admin;
mod config;
mod message_handler;
mod plugin_registry;
mod plugins;
mod rpc;
mod traits;

use config::ServerConfig;
use message_handler::RpcMessageHandler;
use plugin_registry::PluginRegistry;
use traits::MessageHandler;

// --- Shared Application State ---
pub struct AppState {
    registry: Arc<PluginRegistry>,
    provider: Arc<Provider>,
    message_handler: Arc<RpcMessageHandler>,
    data_path: PathBuf,
    request_count: AtomicUsize,
    startup_time: Instant,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &ServerConfig, store: Arc<dyn RecordStore>) -> Result<Self, String> {
        let registry = Arc::new(PluginRegistry::new());
        registry.register_all(plugins::create_plugins(store))?;

        let provider = Arc::new(config.provider.clone());
        let message_handler = Arc::new(RpcMessageHandler::new(registry.clone(), provider.clone()));

        Ok(AppState {
            registry,
            provider,
            message_handler,
            data_path: config.data_path.clone(),
            request_count: AtomicUsize::new(0),
            startup_time: Instant::now(),
            started_at: Utc::now(),
        })
    }
}

// --- Main Function ---
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(&config.data_path));
    let app_state = Arc::new(AppState::new(&config, store)?);
    info!(
        "Registered {} plugins over data at {}",
        app_state.registry.get_all_plugins().len(),
        config.data_path.display()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Storefront server listening on {}", addr);

    axum::serve(listener, build_router(app_state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down successfully");
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rpc", post(handle_rpc))
        .route("/discover", get(discovery_handler))
        .route("/api/admin/stats", get(admin::get_stats))
        .route("/api/admin/plugins", get(admin::get_plugins))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// --- Graceful Shutdown Signal Handler ---
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Shutdown signal received...");
}

async fn handle_rpc(State(state): State<Arc<AppState>>, headers: HeaderMap, body: String) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    let client_id = headers
        .get("x-client-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("http-{}", rand::thread_rng().gen::<u32>()));

    match state.message_handler.handle_message(body, client_id).await {
        Some(response_body) => (StatusCode::OK, [("content-type", "application/json")], response_body).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn discovery_handler(State(state): State<Arc<AppState>>) -> Json<DiscoveryResponse> {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    info!("Handling /discover request");

    let capabilities = state
        .registry
        .get_all_plugins()
        .iter()
        .map(|p| CapabilityDescription {
            name: p.name().to_string(),
            description: p.description().to_string(),
            category: p.category().to_string(),
            operations: p.supported_operations(),
        })
        .collect();

    Json(DiscoveryResponse {
        provider: (*state.provider).clone(),
        capabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(temp_dir: &TempDir) -> Router {
        let config = ServerConfig {
            data_path: temp_dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let store = Arc::new(JsonFileStore::new(temp_dir.path()));
        build_router(Arc::new(AppState::new(&config, store).unwrap()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn rpc(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/rpc")
            .header("content-type", "application/json")
            .header("x-client-id", "test-client")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_discover_lists_plugins() {
        let temp_dir = TempDir::new().unwrap();
        let response = app(&temp_dir)
            .oneshot(Request::builder().uri("/discover").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["provider"]["name"], "Storefront");
        let names: Vec<&str> = body["capabilities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["store_cart", "store_product", "store_review"]);
    }

    #[tokio::test]
    async fn test_rpc_round_trip_through_router() {
        let temp_dir = TempDir::new().unwrap();
        let router = app(&temp_dir);

        for rating in [5, 4, 4] {
            let response = router
                .clone()
                .oneshot(rpc(json!({
                    "jsonrpc": "2.0", "id": 1, "method": "tools/call",
                    "params": {"name": "store_review", "arguments": {
                        "operation": "ADD_REVIEW", "productId": 2, "userName": "ana", "rating": rating
                    }}
                })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router
            .clone()
            .oneshot(rpc(json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": {"name": "store_review", "arguments": {"operation": "REVIEW_SUMMARY", "productId": 2}}
            })))
            .await
            .unwrap();
        let body = body_json(response).await;
        let summary: Value = serde_json::from_str(body["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(summary["totalReviews"], 3);
        assert_eq!(summary["averageRating"], 4.3);
        assert_eq!(summary["ratingBreakdown"]["4"], 2);

        let stats = router
            .oneshot(Request::builder().uri("/api/admin/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let stats = body_json(stats).await;
        assert_eq!(stats["request_count"], 4);
        assert_eq!(stats["plugin_count"], 3);
    }

    #[tokio::test]
    async fn test_parse_error_over_http() {
        let temp_dir = TempDir::new().unwrap();
        let response = app(&temp_dir)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rpc")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_admin_plugins() {
        let temp_dir = TempDir::new().unwrap();
        let response = app(&temp_dir)
            .oneshot(Request::builder().uri("/api/admin/plugins").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        let review = &body["plugins"][2];
        assert_eq!(review["name"], "store_review");
        assert_eq!(review["type"], "Core");
        assert_eq!(review["resources"], json!([]));
        assert_eq!(review["resource_templates"][0], "summary/{productId}");
    }
}
