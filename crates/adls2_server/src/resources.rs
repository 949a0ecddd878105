//! Resource registry: the read-only view of the storage account. Exposes a
//! single resource, the current list of filesystems.

use std::sync::Arc;

use adls2_mcp::types::{
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceContents, ResourcesListResponse,
};
use anyhow::Result;
use serde::Serialize;
use tracing::error;

use crate::client::DataLakeClient;

pub const FILESYSTEMS_URI: &str = "adls2://filesystems";

#[derive(Debug, Serialize)]
struct FilesystemData {
    filesystems: Vec<String>,
    error: String,
}

pub struct ResourceRegistry {
    client: Arc<DataLakeClient>,
}

impl ResourceRegistry {
    pub fn new(client: Arc<DataLakeClient>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ResourcesListResponse {
        ResourcesListResponse {
            resources: vec![Resource {
                uri: FILESYSTEMS_URI.to_string(),
                name: "filesystems".to_string(),
                description: Some("List all filesystems in the storage account".to_string()),
                mime_type: Some("application/json".to_string()),
            }],
            next_cursor: None,
            meta: None,
        }
    }

    pub async fn read(&self, request: ReadResourceRequest) -> Result<ReadResourceResponse> {
        if request.uri != FILESYSTEMS_URI {
            return Err(anyhow::anyhow!("Unknown resource: {}", request.uri));
        }

        let data = match self.client.list_filesystems().await {
            Ok(filesystems) => FilesystemData { filesystems, error: String::new() },
            Err(e) => {
                error!("Error listing filesystems: {e}");
                FilesystemData { filesystems: Vec::new(), error: e.to_string() }
            }
        };

        Ok(ReadResourceResponse {
            contents: vec![ResourceContents {
                uri: request.uri,
                mime_type: Some("application/json".to_string()),
                text: Some(serde_json::to_string(&data)?),
                blob: None,
            }],
        })
    }
}
