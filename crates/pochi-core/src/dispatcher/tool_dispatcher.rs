use crate::{
    CoreResult, PochiError,
    channel::{CommandEvent, CommandPoster},
    dispatcher::{ToolKind, ToolResponse, format},
    library::{ListFilter, RecordingLibrary},
    status::{RecordingStatus, StatusStore},
};

use std::{sync::Arc, time::Duration};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

/// How long a control tool waits for the recorder to confirm a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// Delay before each status read.
    pub interval: Duration,
    /// Number of status reads before giving up.
    pub attempts: u32,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            attempts: 30,
        }
    }
}

/// Executes named tool calls against the Pochi Directory and the recorder.
///
/// Holds no state between calls: every call re-reads the status document or
/// the directory. Concurrent calls are safe but not coordinated.
pub struct ToolDispatcher {
    library: RecordingLibrary,
    status: StatusStore,
    poster: Arc<dyn CommandPoster>,
    confirm: ConfirmPolicy,
}

impl ToolDispatcher {
    /// Dispatcher using the default confirmation policy.
    pub fn new(
        library: RecordingLibrary,
        status: StatusStore,
        poster: Arc<dyn CommandPoster>,
    ) -> Self {
        Self {
            library,
            status,
            poster,
            confirm: ConfirmPolicy::default(),
        }
    }

    /// Replace the confirmation policy.
    pub fn with_confirm_policy(mut self, confirm: ConfirmPolicy) -> Self {
        self.confirm = confirm;
        self
    }

    /// Run the tool `name` with `arguments`. Always produces a response.
    #[instrument(skip(self, arguments))]
    pub async fn call(&self, name: &str, arguments: &Map<String, Value>) -> ToolResponse {
        let Some(tool) = ToolKind::from_name(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return ToolResponse::error(format!("Unknown tool: {}", name));
        };

        let result = match tool {
            ToolKind::StartRecording => self.start_recording().await,
            ToolKind::StopRecording => self.stop_recording().await,
            ToolKind::GetRecordingStatus => Ok(self.recording_status()),
            ToolKind::ListRecordings => self.list_recordings(arguments),
            ToolKind::GetRecordingInfo => self.recording_info(arguments),
            ToolKind::RenameRecording => self.rename_recording(arguments),
            ToolKind::DeleteRecording => self.delete_recording(arguments),
            ToolKind::SearchRecordings => self.search_recordings(arguments),
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                debug!(tool = %name, error = %e, "Tool call failed");
                ToolResponse::from(&e)
            }
        }
    }

    async fn start_recording(&self) -> CoreResult<ToolResponse> {
        if let Some(status) = self.status.read() {
            if status.is_recording {
                return Ok(ToolResponse::ok(format!(
                    "Already recording: {}",
                    file_or_unknown(&status)
                )));
            }
        }

        self.post(CommandEvent::StartRecording);

        Ok(match self.await_status(true).await {
            Some(status) => {
                ToolResponse::ok(format!("Recording started: {}", file_or_unknown(&status)))
            }
            None => ToolResponse::ok(
                "Recording command sent, but could not confirm. Is the Pochi recorder running?",
            ),
        })
    }

    async fn stop_recording(&self) -> CoreResult<ToolResponse> {
        if let Some(status) = self.status.read() {
            if !status.is_recording {
                return Ok(ToolResponse::ok("Not currently recording."));
            }
        }

        self.post(CommandEvent::StopRecording);

        Ok(match self.await_status(false).await {
            Some(_) => ToolResponse::ok("Recording stopped."),
            None => ToolResponse::ok("Stop command sent, but could not confirm."),
        })
    }

    fn post(&self, event: CommandEvent) {
        match self.poster.post(event) {
            Ok(delivered) => info!(event = %event, delivered, "Command posted"),
            // The poll below still runs; the result is simply unconfirmed.
            Err(e) => warn!(event = %event, error = %e, "Failed to post command"),
        }
    }

    /// Poll until the document shows `is_recording == recording`, or give up.
    /// The document is always read at least once.
    async fn await_status(&self, recording: bool) -> Option<RecordingStatus> {
        let attempts = self.confirm.attempts.max(1);
        for attempt in 1..=attempts {
            tokio::time::sleep(self.confirm.interval).await;

            if let Some(status) = self.status.read() {
                if status.is_recording == recording {
                    debug!(attempt, "Command confirmed");
                    return Some(status);
                }
            }
        }

        debug!(attempts, "Command not confirmed");
        None
    }

    fn recording_status(&self) -> ToolResponse {
        let Some(status) = self.status.read() else {
            return ToolResponse::ok(
                "No status available. The Pochi recorder may not be running.",
            );
        };

        let mut lines = vec![format!(
            "Recording: {}",
            if status.is_recording { "Yes" } else { "No" }
        )];
        if let Some(file) = &status.current_file {
            lines.push(format!("Current file: {}", file));
        }
        if let Some(started_at) = status.started_at {
            lines.push(format!("Started at: {}", format::long_timestamp(started_at)));
        }

        ToolResponse::ok(lines.join("\n"))
    }

    fn list_recordings(&self, arguments: &Map<String, Value>) -> CoreResult<ToolResponse> {
        let filter = ListFilter {
            limit: limit_argument(arguments)?,
            date_prefix: optional_str(arguments, "date")?.map(str::to_string),
        };

        let listing = self.library.list(&filter)?;
        if listing.files.is_empty() {
            return Ok(ToolResponse::ok("No recordings found."));
        }

        let mut lines = vec![format!("Found {} recording(s):", listing.total)];
        lines.extend(listing.files.iter().map(format::listing_line));
        if listing.remaining() > 0 {
            lines.push(format!("  ... and {} more", listing.remaining()));
        }

        Ok(ToolResponse::ok(lines.join("\n")))
    }

    fn recording_info(&self, arguments: &Map<String, Value>) -> CoreResult<ToolResponse> {
        let name = required_str(arguments, "filename")?;
        let info = self.library.info(name)?;

        let mut lines = vec![
            format!("File: {}", info.file.name),
            format!("Size: {}", format::megabytes(info.file.size, 2)),
        ];
        if info.file.has_known_time() {
            lines.push(format!(
                "Created: {}",
                format::long_timestamp(info.file.created_at)
            ));
        }
        lines.push(match info.duration {
            Some(duration) => format!("Duration: {}", format::minutes_seconds(duration)),
            None => "Duration: unknown".to_string(),
        });

        Ok(ToolResponse::ok(lines.join("\n")))
    }

    fn rename_recording(&self, arguments: &Map<String, Value>) -> CoreResult<ToolResponse> {
        let name = required_str(arguments, "filename")?;
        let new_name = required_str(arguments, "new_name")?;

        let renamed = self.library.rename(name, new_name)?;

        Ok(ToolResponse::ok(format!("Renamed: {} -> {}", name, renamed)))
    }

    fn delete_recording(&self, arguments: &Map<String, Value>) -> CoreResult<ToolResponse> {
        let name = required_str(arguments, "filename")?;

        self.library.delete(name)?;

        Ok(ToolResponse::ok(format!("Moved to Trash: {}", name)))
    }

    fn search_recordings(&self, arguments: &Map<String, Value>) -> CoreResult<ToolResponse> {
        let query = required_str(arguments, "query")?;

        let matches = self.library.search(query)?;
        if matches.is_empty() {
            return Ok(ToolResponse::ok(format!("No recordings matching '{}'.", query)));
        }

        let mut lines = vec![format!("Found {} matching recording(s):", matches.len())];
        lines.extend(matches.iter().map(format::listing_line));

        Ok(ToolResponse::ok(lines.join("\n")))
    }
}

fn file_or_unknown(status: &RecordingStatus) -> &str {
    status.current_file.as_deref().unwrap_or("unknown")
}

#[track_caller]
fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> CoreResult<&'a str> {
    optional_str(arguments, key)?
        .ok_or_else(|| PochiError::invalid(format!("Missing required parameter: {}", key)))
}

#[track_caller]
fn optional_str<'a>(
    arguments: &'a Map<String, Value>,
    key: &str,
) -> CoreResult<Option<&'a str>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(PochiError::invalid(format!(
            "Parameter '{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// `limit` as a positive count. Accepts integers, floats (truncated) and
/// numeric strings; absent means the default.
#[track_caller]
fn limit_argument(arguments: &Map<String, Value>) -> CoreResult<usize> {
    let raw = match arguments.get("limit") {
        None | Some(Value::Null) => return Ok(ListFilter::default().limit),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        Some(_) => None,
    };

    match raw {
        Some(n) if n >= 1 => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
        _ => Err(PochiError::invalid(format!(
            "Invalid limit: {} (must be a number of at least 1)",
            arguments.get("limit").map(Value::to_string).unwrap_or_default()
        ))),
    }
}
