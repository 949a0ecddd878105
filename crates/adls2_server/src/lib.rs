//! MCP server exposing Azure Data Lake Storage Gen2 operations as tools and
//! resources. Each tool performs one remote call against the storage account
//! and wraps the outcome into a flat JSON response envelope.

pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod tools;
