use adls2_mcp::types::Tool;
use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::{required_str, to_json, ToolArgs};
use crate::client::DataLakeClient;

#[derive(Debug, Serialize)]
struct FilesystemResponse {
    filesystem: String,
    success: bool,
    error: String,
}

/// Create a new filesystem (container) in the storage account.
pub(super) async fn create_filesystem(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let name = required_str(args, "name")?;

    if client.read_only() {
        return to_json(&FilesystemResponse {
            filesystem: name.to_string(),
            success: false,
            error: "Cannot create filesystem in read-only mode".to_string(),
        });
    }

    let response = match client.create_filesystem(name).await {
        Ok(()) => FilesystemResponse {
            filesystem: name.to_string(),
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error creating filesystem {name}: {e}");
            FilesystemResponse {
                filesystem: name.to_string(),
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// Delete a filesystem from the storage account.
pub(super) async fn delete_filesystem(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let name = required_str(args, "name")?;

    if client.read_only() {
        return to_json(&FilesystemResponse {
            filesystem: name.to_string(),
            success: false,
            error: "Cannot delete filesystem in read-only mode".to_string(),
        });
    }

    let response = match client.delete_filesystem(name).await {
        Ok(()) => FilesystemResponse {
            filesystem: name.to_string(),
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error deleting filesystem {name}: {e}");
            FilesystemResponse {
                filesystem: name.to_string(),
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

pub(super) fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "create_filesystem".to_string(),
            description: Some("Create a new filesystem (container) in the storage account".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name of the filesystem to create" }
                },
                "required": ["name"]
            }),
        },
        Tool {
            name: "delete_filesystem".to_string(),
            description: Some("Delete a filesystem from the storage account".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name of the filesystem to delete" }
                },
                "required": ["name"]
            }),
        },
    ]
}
