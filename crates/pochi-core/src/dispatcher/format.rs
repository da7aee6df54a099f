use crate::library::RecordingFile;

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

const BYTES_PER_MB: f64 = 1_048_576.0;

pub(crate) fn megabytes(bytes: u64, precision: usize) -> String {
    format!("{:.*} MB", precision, bytes as f64 / BYTES_PER_MB)
}

pub(crate) fn short_timestamp(at: DateTime<Utc>) -> String {
    if at == RecordingFile::UNKNOWN_TIME {
        return "unknown date".to_string();
    }
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn long_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S %:z")
        .to_string()
}

/// `MM:SS`; minutes keep counting past an hour.
pub(crate) fn minutes_seconds(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// `  name  (1.2 MB, 2026-02-05 10:00)`
pub(crate) fn listing_line(file: &RecordingFile) -> String {
    format!(
        "  {}  ({}, {})",
        file.name,
        megabytes(file.size, 1),
        short_timestamp(file.created_at)
    )
}
