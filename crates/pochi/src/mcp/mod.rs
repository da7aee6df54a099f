//! MCP tool-server over stdio.

mod mcp_server;

pub(crate) use mcp_server::McpServer;
