//! Tool-server side of the protocol.
//!
//! Control tools go through the command channel and are confirmed by polling
//! the status store. File tools act on the Pochi Directory directly.

mod format;
mod tool_catalogue;
mod tool_dispatcher;
mod tool_response;

pub use {
    tool_catalogue::{ToolDefinition, ToolKind, tool_catalogue},
    tool_dispatcher::{ConfirmPolicy, ToolDispatcher},
    tool_response::ToolResponse,
};
