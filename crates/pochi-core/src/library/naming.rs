use crate::{CoreResult, PochiError, paths};

use std::{fs, panic::Location, path::Path};

use chrono::NaiveDate;
use error_location::ErrorLocation;
use regex::Regex;
use tracing::debug;

/// Characters removed from user-supplied names before they touch the disk.
const ILLEGAL_NAME_CHARS: [char; 10] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Strip filesystem-illegal characters from a requested name.
///
/// Returns `None` when nothing but whitespace is left.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let sanitized: String = raw
        .chars()
        .filter(|c| !ILLEGAL_NAME_CHARS.contains(c))
        .collect();

    if sanitized.trim().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Reject anything that is not a bare file name inside the Pochi Directory.
#[track_caller]
pub fn validate_file_name(name: &str) -> CoreResult<()> {
    let bare = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);

    if bare {
        Ok(())
    } else {
        Err(PochiError::InvalidInput {
            reason: format!("Invalid filename: '{}'", name),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Next free `YYYYMMDD-NN.<ext>` name for `date`.
///
/// The sequence is one more than the highest sequence already used that day by
/// any recognized audio file. Unique only as long as a single recorder
/// allocates names.
#[track_caller]
pub fn allocate_file_name(dir: &Path, date: NaiveDate, extension: &str) -> CoreResult<String> {
    paths::ensure_dir(dir)?;

    let prefix = date.format("%Y%m%d").to_string();
    let pattern = Regex::new(&format!(r"^{}-(\d+)\.", regex::escape(&prefix))).map_err(|e| {
        PochiError::InvalidInput {
            reason: format!("Failed to build sequence pattern: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let entries = fs::read_dir(dir).map_err(|e| PochiError::io_at(dir, e))?;

    let mut highest: u32 = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !paths::is_listed_recording(&path) {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(seq) = pattern
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            highest = highest.max(seq);
        }
    }

    let mut seq = highest.saturating_add(1);
    let mut candidate = format!("{}-{:02}.{}", prefix, seq, extension);
    while dir.join(&candidate).exists() {
        seq = seq.saturating_add(1);
        candidate = format!("{}-{:02}.{}", prefix, seq, extension);
    }

    debug!(file = %candidate, "Allocated recording file name");

    Ok(candidate)
}
