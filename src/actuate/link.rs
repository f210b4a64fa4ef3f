use thiserror::Error;

use super::command::RcCommand;

// ---------------------------------------------------------------------------
// Actuator adapter seam
// ---------------------------------------------------------------------------

/// A command failed to reach the vehicle. Recoverable: the loop logs it and
/// retries on the next cycle, aborting only after a configured number of
/// consecutive failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command dispatch failed: {reason}")]
pub struct DispatchError {
    pub reason: String,
}

impl DispatchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Consumes one [`RcCommand`] per control cycle.
///
/// Implement this over a real vehicle transport. `send` is fire-and-forget
/// and may block on the wire; the loop calls it once per cycle. `shutdown`
/// releases vehicle control (land, disarm, or close the link, whatever the
/// transport means by it) and must be idempotent: the loop guarantees it
/// runs exactly once per session, but a transport wrapper may have been
/// stopped out-of-band already.
pub trait ActuatorLink {
    fn send(&mut self, command: RcCommand) -> Result<(), DispatchError>;

    fn shutdown(&mut self);

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Recording link: command capture for tests, demos and replay tooling
// ---------------------------------------------------------------------------

/// Records every command it is given. Never fails.
#[derive(Debug, Default)]
pub struct RecordingLink {
    pub sent: Vec<RcCommand>,
    pub shutdowns: u32,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&RcCommand> {
        self.sent.last()
    }
}

impl ActuatorLink for RecordingLink {
    fn send(&mut self, command: RcCommand) -> Result<(), DispatchError> {
        self.sent.push(command);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }

    fn name(&self) -> &str {
        "recording"
    }
}
