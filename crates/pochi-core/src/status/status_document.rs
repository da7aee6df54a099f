use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The cross-process recording status document.
///
/// Written wholesale by the recorder on every transition and read by the
/// tool-server. Field names match the on-disk JSON (`isRecording`,
/// `currentFile`, `startedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatus {
    /// Whether a recording is in progress.
    pub is_recording: bool,
    /// Basename of the active or most recently started recording.
    #[serde(default)]
    pub current_file: Option<String>,
    /// When the active recording began. `None` while idle.
    #[serde(default, with = "iso8601")]
    pub started_at: Option<DateTime<Utc>>,
}

impl RecordingStatus {
    /// Status for a recording that just began.
    pub fn recording(file: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            is_recording: true,
            current_file: Some(file.into()),
            started_at: Some(started_at),
        }
    }

    /// Idle status, remembering the last file if there was one.
    pub fn idle(last_file: Option<String>) -> Self {
        Self {
            is_recording: false,
            current_file: last_file,
            started_at: None,
        }
    }
}

/// ISO-8601 timestamps with whole seconds (`2026-01-01T10:00:00Z`).
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(D::Error::custom)
        })
        .transpose()
    }
}
