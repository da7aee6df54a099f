use crate::{AppError, AppResult};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use pochi_core::{ToolDefinition, ToolDispatcher, tool_catalogue};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::stdio,
};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

/// Serves the tool catalogue to one MCP client.
///
/// Every `tools/call` goes through [`ToolDispatcher::call`]; the protocol
/// handshake and framing are rmcp's.
#[derive(Clone)]
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl McpServer {
    /// Server answering tool calls with `dispatcher`.
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Serve on stdin/stdout until the client disconnects.
    #[instrument(skip_all)]
    pub async fn serve_stdio(self) -> AppResult<()> {
        info!("MCP server listening on stdio");

        let service = self.serve(stdio()).await.map_err(|e| AppError::TransportError {
            reason: format!("MCP handshake failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let reason = service.waiting().await.map_err(|e| AppError::TransportError {
            reason: format!("MCP service task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(reason = ?reason, "MCP server exiting");

        Ok(())
    }

    /// Catalogue entries as MCP tool descriptors.
    pub fn tools() -> Vec<Tool> {
        tool_catalogue().into_iter().map(to_tool).collect()
    }

    /// Run one tool and wrap its answer as text content.
    pub async fn call(&self, request: CallToolRequestParam) -> CallToolResult {
        let arguments = request.arguments.unwrap_or_default();
        let response = self.dispatcher.call(&request.name, &arguments).await;

        debug!(tool = %request.name, is_error = response.is_error, "Tool call answered");

        let content = vec![Content::text(response.text)];
        if response.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pochi".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Start, stop and manage Pochi audio recordings. Recording control needs the \
                 Pochi menu-bar app to be running."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(Self::tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.call(request).await)
    }
}

fn to_tool(definition: ToolDefinition) -> Tool {
    let schema = match definition.input_schema {
        Value::Object(schema) => schema,
        _ => Map::new(),
    };
    Tool::new(definition.name, definition.description, Arc::new(schema))
}
