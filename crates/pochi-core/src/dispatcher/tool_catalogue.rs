use serde::Serialize;
use serde_json::{Value, json};

/// The tools the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// `start_recording`
    StartRecording,
    /// `stop_recording`
    StopRecording,
    /// `get_recording_status`
    GetRecordingStatus,
    /// `list_recordings`
    ListRecordings,
    /// `get_recording_info`
    GetRecordingInfo,
    /// `rename_recording`
    RenameRecording,
    /// `delete_recording`
    DeleteRecording,
    /// `search_recordings`
    SearchRecordings,
}

impl ToolKind {
    /// Every tool, in catalogue order.
    pub const ALL: [ToolKind; 8] = [
        ToolKind::StartRecording,
        ToolKind::StopRecording,
        ToolKind::GetRecordingStatus,
        ToolKind::ListRecordings,
        ToolKind::GetRecordingInfo,
        ToolKind::RenameRecording,
        ToolKind::DeleteRecording,
        ToolKind::SearchRecordings,
    ];

    /// Name used in `tools/call`.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::StartRecording => "start_recording",
            ToolKind::StopRecording => "stop_recording",
            ToolKind::GetRecordingStatus => "get_recording_status",
            ToolKind::ListRecordings => "list_recordings",
            ToolKind::GetRecordingInfo => "get_recording_info",
            ToolKind::RenameRecording => "rename_recording",
            ToolKind::DeleteRecording => "delete_recording",
            ToolKind::SearchRecordings => "search_recordings",
        }
    }

    /// Look a tool up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Description and input schema advertised in `tools/list`.
    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            ToolKind::StartRecording => (
                "Start audio recording via the Pochi recorder. The recorder must be running.",
                no_arguments(),
            ),
            ToolKind::StopRecording => (
                "Stop the current audio recording via the Pochi recorder.",
                no_arguments(),
            ),
            ToolKind::GetRecordingStatus => (
                "Get the current recording status (is recording, current file, start time).",
                no_arguments(),
            ),
            ToolKind::ListRecordings => (
                "List audio recordings in the Pochi recordings folder, newest first.",
                json!({
                    "type": "object",
                    "properties": {
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of recordings to return. Default is 20."
                        },
                        "date": {
                            "type": "string",
                            "description": "Filter by date in YYYYMMDD format. Only returns recordings from that date."
                        }
                    }
                }),
            ),
            ToolKind::GetRecordingInfo => (
                "Get detailed information about a specific recording (size, duration, creation date).",
                json!({
                    "type": "object",
                    "properties": {
                        "filename": {
                            "type": "string",
                            "description": "The filename of the recording (e.g. '20260205-01.m4a')."
                        }
                    },
                    "required": ["filename"]
                }),
            ),
            ToolKind::RenameRecording => (
                "Rename a recording file. Extension is preserved automatically.",
                json!({
                    "type": "object",
                    "properties": {
                        "filename": {
                            "type": "string",
                            "description": "Current filename of the recording."
                        },
                        "new_name": {
                            "type": "string",
                            "description": "New name for the recording (without extension)."
                        }
                    },
                    "required": ["filename", "new_name"]
                }),
            ),
            ToolKind::DeleteRecording => (
                "Move a recording to the Trash (recoverable).",
                json!({
                    "type": "object",
                    "properties": {
                        "filename": {
                            "type": "string",
                            "description": "Filename of the recording to delete."
                        }
                    },
                    "required": ["filename"]
                }),
            ),
            ToolKind::SearchRecordings => (
                "Search recordings by filename pattern.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query. Matches against filename (case-insensitive)."
                        }
                    },
                    "required": ["query"]
                }),
            ),
        };

        ToolDefinition {
            name: self.name(),
            description,
            input_schema,
        }
    }
}

/// One entry of `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name.
    pub name: &'static str,
    /// What the tool does, for the agent.
    pub description: &'static str,
    /// JSON Schema for the arguments object.
    pub input_schema: Value,
}

/// Definitions for every tool, in a stable order.
pub fn tool_catalogue() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
}

fn no_arguments() -> Value {
    json!({ "type": "object", "properties": {} })
}
