// storefront-client/src/main.rs
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::error::Error;
use storefront_common::RecordId;
use tracing_subscriber::EnvFilter;

mod render;
mod rpc_client;

use render::{render_histogram, render_tool_result};
use rpc_client::RpcClient;

#[derive(Parser)]
#[command(author, version, about = "Command-line client for a storefront server", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(short = 'u', long, env = "STOREFRONT_URL", default_value = "http://localhost:3001")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the provider and its capabilities
    Discover,
    /// List tools with their operations
    Tools,
    /// Call one tool operation
    Call {
        tool: String,
        operation: String,
        /// Arguments as a JSON object
        #[arg(long, value_parser = parse_json)]
        args: Option<Value>,
    },
    /// Print the rating summary of a product
    Summary { product_id: RecordId },
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}

type BoxedError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let client = RpcClient::new(&cli.base_url)?;

    match cli.command {
        Commands::Discover => {
            let discovery = client.discover().await?;
            println!("Provider: {} ({})", discovery.provider.name, discovery.provider.domain);
            if !discovery.provider.description.is_empty() {
                println!("  {}", discovery.provider.description);
            }
            println!("\nCapabilities:");
            for cap in &discovery.capabilities {
                println!("  - {} [{}]: {}", cap.name, cap.category, cap.description);
                println!("    Ops: {}", cap.operations.join(", "));
            }
        }
        Commands::Tools => {
            for tool in client.list_tools().await? {
                println!("- {}", tool.name);
                if let Some(description) = &tool.description {
                    println!("    {}", description);
                }
                let operations: Vec<&str> = tool
                    .input_schema
                    .pointer("/properties/operation/enum")
                    .and_then(Value::as_array)
                    .map(|ops| ops.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                println!("    Ops: {}", operations.join(", "));
            }
        }
        Commands::Call { tool, operation, args } => {
            let result = client
                .call_tool(&tool, &operation, args.unwrap_or(Value::Null))
                .await?;
            print!("{}", render_tool_result(&result));
            if result.is_error {
                return Err(format!("{} {} failed", tool, operation).into());
            }
        }
        Commands::Summary { product_id } => {
            let summary = client.review_summary(product_id).await?;
            println!("Product {}", product_id);
            print!("{}", render_histogram(&summary));
        }
    }
    Ok(())
}
