use adls2_mcp::types::Tool;
use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::{optional_bool, optional_str, required_str, to_json, ToolArgs};
use crate::client::DataLakeClient;

#[derive(Debug, Serialize)]
struct DirectoryResponse {
    filesystem: String,
    path: String,
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct DirectoryRenameResponse {
    source: String,
    destination: String,
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct PathListResponse {
    filesystem: String,
    path: String,
    paths: Vec<String>,
    error: String,
}

/// Create a directory in the specified filesystem.
pub(super) async fn create_directory(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let path = required_str(args, "path")?;

    if client.read_only() {
        return to_json(&DirectoryResponse {
            filesystem: filesystem.to_string(),
            path: path.to_string(),
            success: false,
            error: "Cannot create directory in read-only mode".to_string(),
        });
    }

    let response = match client.create_directory(filesystem, path).await {
        Ok(()) => DirectoryResponse {
            filesystem: filesystem.to_string(),
            path: path.to_string(),
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error creating directory {path} in {filesystem}: {e}");
            DirectoryResponse {
                filesystem: filesystem.to_string(),
                path: path.to_string(),
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// Delete a directory from the specified filesystem.
pub(super) async fn delete_directory(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let path = required_str(args, "path")?;

    if client.read_only() {
        return to_json(&DirectoryResponse {
            filesystem: filesystem.to_string(),
            path: path.to_string(),
            success: false,
            error: "Cannot delete directory in read-only mode".to_string(),
        });
    }

    let response = match client.delete_directory(filesystem, path).await {
        Ok(()) => DirectoryResponse {
            filesystem: filesystem.to_string(),
            path: path.to_string(),
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error deleting directory {path} in {filesystem}: {e}");
            DirectoryResponse {
                filesystem: filesystem.to_string(),
                path: path.to_string(),
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// Rename/move a directory within the specified filesystem.
pub(super) async fn rename_directory(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let source_path = required_str(args, "source_path")?;
    let destination_path = required_str(args, "destination_path")?;
    // The reported destination is always scoped under the filesystem.
    let destination = format!("{filesystem}/{destination_path}");

    if client.read_only() {
        return to_json(&DirectoryRenameResponse {
            source: source_path.to_string(),
            destination,
            success: false,
            error: "Cannot rename directory in read-only mode".to_string(),
        });
    }

    let response = match client
        .rename_directory(filesystem, source_path, destination_path)
        .await
    {
        Ok(()) => DirectoryRenameResponse {
            source: source_path.to_string(),
            destination,
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error renaming directory {source_path} to {destination_path}: {e}");
            DirectoryRenameResponse {
                source: source_path.to_string(),
                destination,
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// List path names under a directory, recursively by default.
pub(super) async fn list_paths(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let path = optional_str(args, "path");
    let recursive = optional_bool(args, "recursive", true);

    let response = match client.list_paths(filesystem, path, recursive).await {
        Ok(paths) => PathListResponse {
            filesystem: filesystem.to_string(),
            path: path.to_string(),
            paths,
            error: String::new(),
        },
        Err(e) => {
            error!("Error listing paths under {path} in {filesystem}: {e}");
            PathListResponse {
                filesystem: filesystem.to_string(),
                path: path.to_string(),
                paths: Vec::new(),
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

pub(super) fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "create_directory".to_string(),
            description: Some("Create a directory in the specified filesystem".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "path": { "type": "string", "description": "Directory path relative to the filesystem root" }
                },
                "required": ["filesystem", "path"]
            }),
        },
        Tool {
            name: "delete_directory".to_string(),
            description: Some("Delete a directory from the specified filesystem".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "path": { "type": "string", "description": "Directory path relative to the filesystem root" }
                },
                "required": ["filesystem", "path"]
            }),
        },
        Tool {
            name: "rename_directory".to_string(),
            description: Some("Rename/move a directory within the specified filesystem".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "source_path": { "type": "string", "description": "Current path of the directory relative to the filesystem root" },
                    "destination_path": { "type": "string", "description": "New path for the directory relative to the filesystem root" }
                },
                "required": ["filesystem", "source_path", "destination_path"]
            }),
        },
        Tool {
            name: "list_paths".to_string(),
            description: Some("List paths under a directory in the specified filesystem".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "path": { "type": "string", "description": "Directory path relative to the filesystem root; defaults to the root" },
                    "recursive": { "type": "boolean", "description": "Include the full subtree; defaults to true" }
                },
                "required": ["filesystem"]
            }),
        },
    ]
}
