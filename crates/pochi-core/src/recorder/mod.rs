//! Recorder side of the protocol: the only place recording state changes.

mod capture_backend;
mod meter;
mod recorder_session;
mod recording_state;
mod sleep_guard;
mod state_machine;
mod wav_capture;

pub use {
    capture_backend::CaptureBackend,
    meter::{Meter, MeterReading},
    recorder_session::{RecorderSession, SessionUpdate},
    recording_state::RecordingState,
    sleep_guard::SleepGuard,
    state_machine::{Recorder, TickOutcome, Transition},
    wav_capture::WavCapture,
};
