//! Best-effort media duration lookup.
//!
//! Reads just enough of the container to find the duration. Any failure means
//! "unknown", never an error for the caller.

use std::{fs::File, io, path::Path, time::Duration};

use symphonia::core::{
    codecs::CODEC_TYPE_NULL,
    errors::Error as SymphoniaError,
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
    units::TimeBase,
};
use tracing::debug;

/// Duration of the recording at `path`, if it can be determined.
///
/// WAV, MP3 and M4A/MP4 are read through their demuxers. The frame count
/// from the container header is used when present; otherwise packet
/// durations are summed without decoding.
pub fn read_duration(path: &Path) -> Option<Duration> {
    match demuxed_duration(path) {
        Ok(duration) => duration,
        Err(e) => {
            debug!(path = ?path, error = %e, "Could not read media duration");
            None
        }
    }
}

fn demuxed_duration(path: &Path) -> Result<Option<Duration>, SymphoniaError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let Some(track) = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
    else {
        return Ok(None);
    };

    let track_id = track.id;
    let params = &track.codec_params;
    let time_base = params
        .time_base
        .or_else(|| {
            params
                .sample_rate
                .filter(|&rate| rate > 0)
                .map(|rate| TimeBase::new(1, rate))
        });
    let Some(time_base) = time_base else {
        return Ok(None);
    };

    let n_frames = params.n_frames;

    let frames = match n_frames {
        Some(frames) => frames,
        None => count_frames(format.as_mut(), track_id)?,
    };

    Ok(to_duration(time_base, frames))
}

/// Sum packet durations of `track_id` until the stream ends.
fn count_frames(format: &mut dyn FormatReader, track_id: u32) -> Result<u64, SymphoniaError> {
    let mut frames: u64 = 0;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => {
                frames = frames.saturating_add(packet.dur);
            }
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Ok(frames);
            }
            Err(e) => return Err(e),
        }
    }
}

fn to_duration(time_base: TimeBase, frames: u64) -> Option<Duration> {
    if time_base.denom == 0 {
        return None;
    }
    let time = time_base.calc_time(frames);
    let frac = Duration::try_from_secs_f64(time.frac).ok()?;
    Some(Duration::from_secs(time.seconds) + frac)
}
