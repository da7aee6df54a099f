use crate::{CoreResult, PochiError};

use std::{
    io,
    process::{Child, Command, Stdio},
};

use tracing::{debug, info, warn};

/// RAII guard that keeps the system awake while it is alive.
///
/// Backed by a helper process holding the platform's idle-sleep assertion.
/// Dropping the guard kills the helper, which releases the assertion.
pub struct SleepGuard {
    child: Child,
}

impl SleepGuard {
    /// Take an idle-sleep assertion.
    #[track_caller]
    pub fn acquire(reason: &str) -> CoreResult<Self> {
        let mut command = inhibit_command(reason)?;

        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(PochiError::from)?;

        info!(pid = child.id(), "Sleep prevention acquired");

        Ok(Self { child })
    }
}

impl Drop for SleepGuard {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            // Already exited is fine.
            if e.kind() != io::ErrorKind::InvalidInput {
                warn!(error = %e, "Failed to stop sleep prevention helper");
            }
        }
        let _ = self.child.wait();
        debug!("Sleep prevention released");
    }
}

#[cfg(target_os = "macos")]
fn inhibit_command(_reason: &str) -> CoreResult<Command> {
    let mut command = Command::new("caffeinate");
    command.args(["-i", "-w", &std::process::id().to_string()]);
    Ok(command)
}

#[cfg(target_os = "linux")]
fn inhibit_command(reason: &str) -> CoreResult<Command> {
    let mut command = Command::new("systemd-inhibit");
    command.args([
        "--what=idle:sleep",
        "--who=Pochi",
        &format!("--why={}", reason),
        "--mode=block",
        "sleep",
        "infinity",
    ]);
    Ok(command)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
#[track_caller]
fn inhibit_command(_reason: &str) -> CoreResult<Command> {
    Err(PochiError::from(io::Error::new(
        io::ErrorKind::Unsupported,
        "sleep prevention is not supported on this platform",
    )))
}
