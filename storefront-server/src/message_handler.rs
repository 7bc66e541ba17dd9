// storefront-server/src/message_handler.rs
use crate::plugin_registry::PluginRegistry;
use crate::rpc::{create_error_response, process_rpc_message};
use crate::traits::MessageHandler;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use storefront_common::Provider;
use tracing::{error, info};

const INTERNAL_ERROR: i32 = -32603;

pub struct RpcMessageHandler {
    registry: Arc<PluginRegistry>,
    provider: Arc<Provider>,
}

impl RpcMessageHandler {
    pub fn new(registry: Arc<PluginRegistry>, provider: Arc<Provider>) -> Self {
        Self { registry, provider }
    }
}

impl MessageHandler for RpcMessageHandler {
    fn handle_message<'a>(
        &'a self,
        message: String,
        client_id: String,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        info!("Processing message from client {}", client_id);

        let registry = self.registry.clone();
        let provider = self.provider.clone();
        Box::pin(async move {
            // Plugins read and write the record store synchronously.
            let outcome =
                tokio::task::spawn_blocking(move || process_rpc_message(&message, &registry, &provider)).await;
            match outcome {
                Ok(response) => response,
                Err(e) => {
                    error!("RPC worker for client {} failed: {}", client_id, e);
                    Some(create_error_response(Value::Null, INTERNAL_ERROR, "Internal error".to_string()))
                }
            }
        })
    }
}
