use std::sync::Arc;

use adls2_mcp::server::Server;
use adls2_mcp::transport::ServerStdioTransport;
use adls2_mcp::types::{CallToolRequest, ListRequest, ReadResourceRequest, ServerCapabilities};
use adls2_server::client::{Credential, DataLakeClient};
use adls2_server::config::Adls2Config;
use adls2_server::resources::ResourceRegistry;
use adls2_server::tools::ToolRegistry;
use anyhow::Result;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        // needs to be stderr due to stdio transport
        .with_writer(std::io::stderr)
        .init();

    let config = Adls2Config::from_env()?;
    let client = Arc::new(DataLakeClient::new(config, Credential::from_env())?);
    let tools = Arc::new(ToolRegistry::new(client.clone()));
    let resources = Arc::new(ResourceRegistry::new(client));

    let tools_list = tools.clone();
    let resources_list = resources.clone();

    let server = Server::builder(ServerStdioTransport)
        .name("adls2-mcp-server")
        .version(env!("CARGO_PKG_VERSION"))
        .capabilities(ServerCapabilities {
            tools: Some(json!({})),
            resources: Some(json!({})),
            ..Default::default()
        })
        .request_handler("tools/list", move |_req: Option<ListRequest>| {
            let tools = tools_list.clone();
            async move { Ok(tools.list()) }
        })
        .request_handler("tools/call", move |req: CallToolRequest| {
            let tools = tools.clone();
            async move { tools.call(req).await }
        })
        .request_handler("resources/list", move |_req: Option<ListRequest>| {
            let resources = resources_list.clone();
            async move { Ok(resources.list()) }
        })
        .request_handler("resources/read", move |req: ReadResourceRequest| {
            let resources = resources.clone();
            async move { resources.read(req).await }
        })
        .build();

    server.listen().await
}
