//! Minimal MCP (Model Context Protocol) server framework: JSON-RPC message
//! types, a stdio transport, and a method-dispatch protocol with typed async
//! request handlers.

pub mod protocol;
pub mod server;
pub mod transport;
pub mod types;
