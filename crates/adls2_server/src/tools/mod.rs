//! Tool registry: binds each storage client method to a named MCP tool.
//! Mutating tools are gated by read-only mode; storage errors are translated
//! into failure envelopes here, never surfaced as protocol errors.

mod directories;
mod files;
mod filesystems;

use std::collections::HashMap;
use std::sync::Arc;

use adls2_mcp::types::{
    CallToolRequest, CallToolResponse, ToolResponseContent, ToolsListResponse,
};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::client::DataLakeClient;

pub struct ToolRegistry {
    client: Arc<DataLakeClient>,
}

impl ToolRegistry {
    pub fn new(client: Arc<DataLakeClient>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ToolsListResponse {
        let mut tools = filesystems::tools();
        tools.extend(directories::tools());
        tools.extend(files::tools());
        ToolsListResponse { tools, next_cursor: None, meta: None }
    }

    pub async fn call(&self, request: CallToolRequest) -> Result<CallToolResponse> {
        let args = request.arguments.unwrap_or_default();
        let client = self.client.as_ref();
        let text = match request.name.as_str() {
            "create_filesystem" => filesystems::create_filesystem(client, &args).await?,
            "delete_filesystem" => filesystems::delete_filesystem(client, &args).await?,
            "create_directory" => directories::create_directory(client, &args).await?,
            "delete_directory" => directories::delete_directory(client, &args).await?,
            "rename_directory" => directories::rename_directory(client, &args).await?,
            "list_paths" => directories::list_paths(client, &args).await?,
            "upload_file" => files::upload_file(client, &args).await?,
            "download_file" => files::download_file(client, &args).await?,
            "file_exists" => files::file_exists(client, &args).await?,
            "rename_file" => files::rename_file(client, &args).await?,
            _ => return Err(anyhow::anyhow!("Unknown tool: {}", request.name)),
        };
        Ok(CallToolResponse {
            content: vec![ToolResponseContent::Text { text }],
            is_error: None,
            meta: None,
        })
    }
}

pub(crate) type ToolArgs = HashMap<String, Value>;

pub(crate) fn required_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing argument: {key}"))
}

pub(crate) fn optional_str<'a>(args: &'a ToolArgs, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

pub(crate) fn optional_bool(args: &ToolArgs, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub(crate) fn to_json<T: Serialize>(envelope: &T) -> Result<String> {
    Ok(serde_json::to_string(envelope)?)
}
