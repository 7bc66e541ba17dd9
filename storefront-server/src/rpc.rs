// storefront-server/src/rpc.rs
use serde::Serialize;
use serde_json::{json, Value};
use storefront_common::{
    error_codes, CallToolResult, ContentItem, EmptyResult, Implementation, InitializeResult,
    ListResourceTemplatesResult, ListResourcesResult, ListToolsResult, Provider, ReadResourceResult, Resource,
    ResourceTemplate, ResourcesCapability, RpcRequest, ServerCapabilities, TextResourceContents, Tool,
    ToolsCapability, PROTOCOL_VERSION, RESOURCE_SCHEME,
};
use tracing::{error, info, warn};
use url::Url;

use crate::plugin_registry::PluginRegistry;

/// Handle one JSON-RPC message and produce the serialized response.
pub fn process_rpc_message(message: &str, registry: &PluginRegistry, provider: &Provider) -> Option<String> {
    match serde_json::from_str::<RpcRequest>(message) {
        Ok(req) => {
            let span = tracing::info_span!("rpc_request", id = %req.id, method = %req.method);
            let _enter = span.enter();
            info!("Processing");
            match req.method.as_str() {
                "initialize" => Some(handle_initialize(&req, registry, provider)),
                "tools/list" => Some(handle_list_tools(&req, registry)),
                "tools/call" => Some(handle_call_tool(&req, registry)),
                "resources/list" => Some(handle_list_resources(&req, registry, provider)),
                "resources/templates/list" => Some(handle_list_resource_templates(&req, registry, provider)),
                "resources/read" => Some(handle_read_resource(&req, registry, provider)),
                "ping" => Some(success_response(&req.id, &EmptyResult {})),
                _ => {
                    warn!("Method not found: {}", req.method);
                    Some(create_error_response(
                        req.id,
                        error_codes::METHOD_NOT_FOUND,
                        format!("Method not found: {}", req.method),
                    ))
                }
            }
        }
        Err(e) => {
            error!("Parse error: {}", e);
            Some(create_error_response(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    }
}

fn handle_initialize(request: &RpcRequest, registry: &PluginRegistry, provider: &Provider) -> String {
    let tool_names: Vec<String> = registry.get_all_plugins().iter().map(|p| p.name().to_string()).collect();
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            resources: Some(ResourcesCapability { list_changed: false }),
            tools: Some(ToolsCapability { list_changed: false }),
        },
        server_info: Implementation {
            name: provider.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        instructions: Some(format!("{} Tools: {}", provider.description, tool_names.join(", "))),
    };
    success_response(&request.id, &result)
}

fn handle_list_tools(request: &RpcRequest, registry: &PluginRegistry) -> String {
    let tools = registry
        .get_all_plugins()
        .iter()
        .map(|p| Tool {
            name: p.name().to_string(),
            description: Some(p.description().to_string()),
            input_schema: p.input_schema(),
            annotations: p.get_tool_annotations(),
        })
        .collect();
    success_response(&request.id, &ListToolsResult { tools })
}

fn handle_call_tool(request: &RpcRequest, registry: &PluginRegistry) -> String {
    let params = request.params.as_ref().and_then(Value::as_object);
    let (Some(name), Some(args)) = (
        params.and_then(|p| p.get("name")).and_then(Value::as_str),
        params.and_then(|p| p.get("arguments")),
    ) else {
        return create_error_response(
            request.id.clone(),
            error_codes::INVALID_PARAMS,
            "Invalid params for tools/call".to_string(),
        );
    };

    let Some(operation) = args.get("operation").and_then(Value::as_str) else {
        return create_error_response(
            request.id.clone(),
            error_codes::INVALID_PARAMS,
            "tools/call arguments require an 'operation'".to_string(),
        );
    };

    // A failing tool is still a successful JSON-RPC exchange.
    let result = match registry.execute_plugin(name, operation, args) {
        Ok(value) => CallToolResult {
            content: match value {
                Value::Null => vec![],
                Value::String(s) => vec![ContentItem::text(s)],
                other => vec![ContentItem::text(
                    serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
                )],
            },
            is_error: false,
        },
        Err(e) => {
            warn!("Tool {} {} failed: {}", name, operation, e);
            CallToolResult {
                content: vec![ContentItem::text(format!("Execution error: {}", e))],
                is_error: true,
            }
        }
    };
    success_response(&request.id, &result)
}

fn handle_list_resources(request: &RpcRequest, registry: &PluginRegistry, provider: &Provider) -> String {
    let resources = registry
        .get_all_plugins()
        .iter()
        .flat_map(|p| {
            p.get_resources().into_iter().map(move |(name, suffix, description)| Resource {
                uri: resource_uri(provider, p.name(), &suffix),
                name,
                description,
                mime_type: Some("application/json".to_string()),
            })
        })
        .collect();
    success_response(&request.id, &ListResourcesResult { resources })
}

fn handle_list_resource_templates(request: &RpcRequest, registry: &PluginRegistry, provider: &Provider) -> String {
    let resource_templates = registry
        .get_all_plugins()
        .iter()
        .flat_map(|p| {
            p.get_resource_templates()
                .into_iter()
                .map(move |(name, suffix, description)| ResourceTemplate {
                    uri_template: resource_uri(provider, p.name(), &suffix),
                    name,
                    description,
                    mime_type: Some("application/json".to_string()),
                })
        })
        .collect();
    success_response(&request.id, &ListResourceTemplatesResult { resource_templates })
}

fn handle_read_resource(request: &RpcRequest, registry: &PluginRegistry, provider: &Provider) -> String {
    let invalid = |message: String| create_error_response(request.id.clone(), error_codes::INVALID_PARAMS, message);

    let Some(raw_uri) = request.params.as_ref().and_then(|p| p.get("uri")).and_then(Value::as_str) else {
        return invalid("Missing 'uri' for resources/read".to_string());
    };
    let uri = match Url::parse(raw_uri) {
        Ok(uri) => uri,
        Err(e) => return invalid(format!("Invalid URI '{}': {}", raw_uri, e)),
    };
    if uri.scheme() != RESOURCE_SCHEME {
        return invalid(format!("Unsupported scheme '{}'", uri.scheme()));
    }
    if uri.host_str() != Some(provider.domain.as_str()) {
        warn!("Resource requested for foreign domain: {:?}", uri.host_str());
    }

    let path: Vec<&str> = uri.path_segments().map(|s| s.collect()).unwrap_or_default();
    if path.len() < 3 || path[0] != "resources" {
        return invalid(format!("Invalid resource path '{}'", uri.path()));
    }
    let (plugin_name, suffix) = (path[1], path[2..].join("/"));

    let Some(plugin) = registry.get_plugin(plugin_name) else {
        return invalid(format!("Plugin '{}' not found", plugin_name));
    };

    match plugin.read_resource(&suffix) {
        Ok(ContentItem::Text { text }) => {
            let result = ReadResourceResult {
                contents: vec![TextResourceContents {
                    uri: raw_uri.to_string(),
                    mime_type: Some("application/json".to_string()),
                    text,
                }],
            };
            success_response(&request.id, &result)
        }
        Err(e) => {
            warn!("Resource read failed for {}: {}", raw_uri, e);
            create_error_response(
                request.id.clone(),
                error_codes::RESOURCE_ERROR,
                format!("Resource read failed: {}", e),
            )
        }
    }
}

pub fn resource_uri(provider: &Provider, plugin: &str, suffix: &str) -> String {
    format!("{}://{}/resources/{}/{}", RESOURCE_SCHEME, provider.domain, plugin, suffix)
}

fn success_response(id: &Value, result: &impl Serialize) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string()
}

pub fn create_error_response(id: Value, code: i32, message: String) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } }).to_string()
}
