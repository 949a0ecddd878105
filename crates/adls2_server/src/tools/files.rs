use std::path::Path;

use adls2_mcp::types::Tool;
use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::{required_str, to_json, ToolArgs};
use crate::client::DataLakeClient;

#[derive(Debug, Serialize)]
struct FileResponse {
    source: String,
    destination: String,
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct FileDownloadResponse {
    source: String,
    destination: String,
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct FileExistsResponse {
    path: String,
    exists: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct FileRenameResponse {
    source: String,
    destination: String,
    success: bool,
    error: String,
}

/// Upload a local file to the filesystem.
pub(super) async fn upload_file(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let source = required_str(args, "upload_file")?;
    let filesystem = required_str(args, "filesystem")?;
    let destination = required_str(args, "destination")?;

    if client.read_only() {
        return to_json(&FileResponse {
            source: source.to_string(),
            destination: destination.to_string(),
            success: false,
            error: "Cannot upload file in read-only mode".to_string(),
        });
    }

    let response = match client
        .upload_file(Path::new(source), filesystem, destination)
        .await
    {
        Ok(()) => FileResponse {
            source: source.to_string(),
            destination: destination.to_string(),
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error uploading file {source} to {destination}: {e}");
            FileResponse {
                source: source.to_string(),
                destination: destination.to_string(),
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// Download a file from the filesystem to a local path.
pub(super) async fn download_file(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let source = required_str(args, "source")?;
    let download_path = required_str(args, "download_path")?;

    let response = match client
        .download_file(filesystem, source, Path::new(download_path))
        .await
    {
        Ok(()) => FileDownloadResponse {
            source: source.to_string(),
            destination: download_path.to_string(),
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error downloading file {source} to {download_path}: {e}");
            FileDownloadResponse {
                source: source.to_string(),
                destination: download_path.to_string(),
                success: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// Check if a file exists in the specified filesystem.
pub(super) async fn file_exists(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let file_path = required_str(args, "file_path")?;

    let response = match client.file_exists(filesystem, file_path).await {
        Ok(exists) => FileExistsResponse {
            path: file_path.to_string(),
            exists,
            error: String::new(),
        },
        Err(e) => {
            error!("Error checking file existence {file_path}: {e}");
            FileExistsResponse {
                path: file_path.to_string(),
                exists: false,
                error: e.to_string(),
            }
        }
    };
    to_json(&response)
}

/// Rename/move a file within the specified filesystem.
pub(super) async fn rename_file(client: &DataLakeClient, args: &ToolArgs) -> Result<String> {
    let filesystem = required_str(args, "filesystem")?;
    let source_path = required_str(args, "source_path")?;
    let destination_path = required_str(args, "destination_path")?;
    // The reported destination is always scoped under the filesystem.
    let destination = format!("{filesystem}/{destination_path}");

    if client.read_only() {
        return to_json(&FileRenameResponse {
            source: source_path.to_string(),
            destination,
            success: false,
            error: "Cannot rename file in read-only mode".to_string(),
        });
    }

    let response = match client
        .rename_file(filesystem, source_path, destination_path)
        .await
    {
        Ok(()) => FileRenameResponse {
            source: source_path.to_string(),
            destination,
            success: true,
            error: String::new(),
        },
        Err(e) => {
            error!("Error renaming file {source_path} to {destination_path}: {e}");
            FileRenameResponse {
                source: source_path.to_string(),
                destination,
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
            name: "upload_file".to_string(),
            description: Some("Upload a file to ADLS2".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "upload_file": { "type": "string", "description": "Path to the local file to upload" },
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "destination": { "type": "string", "description": "Destination path in ADLS2" }
                },
                "required": ["upload_file", "filesystem", "destination"]
            }),
        },
        Tool {
            name: "download_file".to_string(),
            description: Some("Download a file from ADLS2".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "source": { "type": "string", "description": "Source path in ADLS2" },
                    "download_path": { "type": "string", "description": "Local path to save the file to" }
                },
                "required": ["filesystem", "source", "download_path"]
            }),
        },
        Tool {
            name: "file_exists".to_string(),
            description: Some("Check if a file exists in the specified filesystem".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "file_path": { "type": "string", "description": "Path to the file relative to the filesystem root" }
                },
                "required": ["filesystem", "file_path"]
            }),
        },
        Tool {
            name: "rename_file".to_string(),
            description: Some("Rename/move a file within the specified filesystem".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filesystem": { "type": "string", "description": "Name of the filesystem" },
                    "source_path": { "type": "string", "description": "Current path of the file relative to the filesystem root" },
                    "destination_path": { "type": "string", "description": "New path for the file relative to the filesystem root" }
                },
                "required": ["filesystem", "source_path", "destination_path"]
            }),
        },
    ]
}
