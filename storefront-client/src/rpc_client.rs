// storefront-client/src/rpc_client.rs
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use storefront_common::{
    CallToolResult, ContentItem, DiscoveryResponse, ListToolsResult, RatingSummary, RecordId, RpcRequest,
    RpcResponse, Tool,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server returned error {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("Response to '{0}' carried neither result nor error")]
    EmptyResponse(String),

    #[error("Tool call failed: {0}")]
    Tool(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// JSON-RPC client for a storefront server.
pub struct RpcClient {
    http: reqwest::Client,
    base: Url,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        // Without a trailing slash, `join` would replace the last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|source| ClientError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(RpcClient {
            http: reqwest::Client::new(),
            base,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base.join(path).map_err(|source| ClientError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            source,
        })
    }

    pub async fn discover(&self) -> ClientResult<DiscoveryResponse> {
        let url = self.endpoint("discover")?;
        debug!("GET {}", url);
        Ok(self.http.get(url).send().await?.error_for_status()?.json().await?)
    }

    pub async fn request(&self, method: &str, params: Option<Value>) -> ClientResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);
        let url = self.endpoint("rpc")?;
        debug!("POST {} method={} id={}", url, method, id);

        let response: RpcResponse = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        into_result(method, response)
    }

    pub async fn list_tools(&self) -> ClientResult<Vec<Tool>> {
        let result: ListToolsResult = serde_json::from_value(self.request("tools/list", None).await?)?;
        Ok(result.tools)
    }

    pub async fn call_tool(&self, name: &str, operation: &str, arguments: Value) -> ClientResult<CallToolResult> {
        let arguments = tool_arguments(operation, arguments)?;
        let result = self
            .request("tools/call", Some(json!({ "name": name, "arguments": arguments })))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn review_summary(&self, product_id: RecordId) -> ClientResult<RatingSummary> {
        let result = self
            .call_tool("store_review", "REVIEW_SUMMARY", json!({ "productId": product_id }))
            .await?;
        parse_tool_payload(&result)
    }
}

fn into_result(method: &str, response: RpcResponse) -> ClientResult<Value> {
    if let Some(error) = response.error {
        return Err(ClientError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response.result.ok_or_else(|| ClientError::EmptyResponse(method.to_string()))
}

/// Merge the operation into the argument object.
pub fn tool_arguments(operation: &str, arguments: Value) -> ClientResult<Value> {
    let mut object = match arguments {
        Value::Null => serde_json::Map::new(),
        Value::Object(object) => object,
        other => return Err(ClientError::Tool(format!("arguments must be a JSON object, got {}", other))),
    };
    object.insert("operation".to_string(), json!(operation));
    Ok(Value::Object(object))
}

/// Decode the first text item of a successful tool result.
pub fn parse_tool_payload<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> ClientResult<T> {
    let text = result
        .content
        .iter()
        .map(|item| match item {
            ContentItem::Text { text } => text.as_str(),
        })
        .next()
        .unwrap_or_default();

    if result.is_error {
        return Err(ClientError::Tool(text.to_string()));
    }
    Ok(serde_json::from_str(text)?)
}
