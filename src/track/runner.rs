use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};
use thiserror::Error;

use crate::actuate::{ActuatorLink, RcCommand};
use crate::control::{AxisError, ServoController};
use crate::tuning::TrackProfile;
use crate::vision::DetectionSource;

use super::clock::Clock;

// ---------------------------------------------------------------------------
// Loop configuration and per-cycle records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Stop after this many cycles; `None` runs until the stop flag.
    pub max_cycles: Option<u64>,
    /// Consecutive dispatch failures tolerated before the loop aborts.
    pub max_dispatch_failures: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_cycles: None,
            max_dispatch_failures: 5,
        }
    }
}

/// Loop state: either the target is in view or it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// No target visible; the loop commands neutral and waits.
    Searching,
    /// Target in view; the servo channels drive the command.
    Tracking,
}

impl Default for TrackState {
    fn default() -> Self {
        Self::Searching
    }
}

/// What one cycle saw and commanded. `error` is `Some` only when the PID
/// update actually ran (a fix was present and its timestep was accepted).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub t: f64,
    pub state: TrackState,
    pub error: Option<AxisError>,
    pub command: RcCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The external stop flag was raised.
    Interrupted,
    /// The configured cycle budget ran out.
    CycleBudget,
}

/// A finished run: every cycle's record plus why the loop stopped.
#[derive(Debug, Clone)]
pub struct Session {
    pub records: Vec<CycleRecord>,
    pub reason: StopReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// The actuator kept rejecting commands; continuing would leave the
    /// vehicle uncommanded, so the loop shut down and gave up.
    #[error("aborted after {failures} consecutive dispatch failures")]
    DispatchLimit { failures: u32 },
}

// ---------------------------------------------------------------------------
// The tracking loop
// ---------------------------------------------------------------------------

/// Run the visual-servo loop with a caller-owned controller.
///
/// One synchronous cycle: check the stop flag, stamp the cycle, pull one
/// detection, steer or fall back to neutral, dispatch, record. Whatever
/// ends the run, normal or fatal, the shutdown sequence executes exactly
/// once: a final neutral command (best effort) followed by
/// [`ActuatorLink::shutdown`].
pub fn track_with(
    profile: &TrackProfile,
    config: &LoopConfig,
    servo: &mut ServoController,
    source: &mut dyn DetectionSource,
    link: &mut dyn ActuatorLink,
    clock: &mut dyn Clock,
    stop: &AtomicBool,
) -> Result<Session, TrackError> {
    let cap = config.max_cycles.unwrap_or(1024).min(100_000) as usize;
    let mut records = Vec::with_capacity(cap);
    let mut state = TrackState::Searching;
    let mut cycle: u64 = 0;
    let mut dispatch_failures: u32 = 0;

    servo.prime(clock.now());
    info!(
        "tracking loop started: profile '{}', source '{}', link '{}'",
        profile.name,
        source.name(),
        link.name()
    );

    let outcome = loop {
        // Cooperative cancellation, checked once per cycle boundary.
        if stop.load(Ordering::Relaxed) {
            break Ok(StopReason::Interrupted);
        }
        if let Some(max) = config.max_cycles {
            if cycle >= max {
                break Ok(StopReason::CycleBudget);
            }
        }

        let now = clock.now();
        let fix = match source.detect() {
            Ok(fix) => fix,
            Err(e) => {
                // A failed frame is a no-target frame, never a crash.
                warn!("cycle {}: {}", cycle, e);
                None
            }
        };

        let (next_state, err, command) = match fix {
            Some(fix) => {
                if state == TrackState::Searching {
                    info!(
                        "target acquired at t={:.3} ({:.0}, {:.0}, area {:.0})",
                        now, fix.cx, fix.cy, fix.area
                    );
                    if profile.reset_on_reacquire {
                        servo.reset();
                    }
                }
                match servo.steer(&fix, now) {
                    Ok(cmd) => (TrackState::Tracking, Some(servo.errors(&fix)), cmd),
                    Err(e) => {
                        warn!("cycle {}: update skipped: {}", cycle, e);
                        (TrackState::Tracking, None, RcCommand::neutral())
                    }
                }
            }
            None => {
                if state == TrackState::Tracking {
                    info!("target lost at t={:.3}", now);
                }
                (TrackState::Searching, None, RcCommand::neutral())
            }
        };

        records.push(CycleRecord { cycle, t: now, state: next_state, error: err, command });

        match link.send(command) {
            Ok(()) => dispatch_failures = 0,
            Err(e) => {
                dispatch_failures += 1;
                warn!(
                    "cycle {}: {} ({}/{} consecutive)",
                    cycle, e, dispatch_failures, config.max_dispatch_failures
                );
                if dispatch_failures >= config.max_dispatch_failures {
                    break Err(TrackError::DispatchLimit { failures: dispatch_failures });
                }
            }
        }

        state = next_state;
        cycle += 1;
    };

    // Guaranteed shutdown sequence: neutral out, then release the vehicle.
    // Every exit path above funnels through here, exactly once.
    if let Err(e) = link.send(RcCommand::neutral()) {
        warn!("neutral command during shutdown failed: {}", e);
    }
    link.shutdown();

    match outcome {
        Ok(reason) => {
            info!("tracking loop stopped after {} cycles ({:?})", cycle, reason);
            Ok(Session { records, reason })
        }
        Err(e) => {
            error!("tracking loop aborted: {}", e);
            Err(e)
        }
    }
}

/// Run the loop with a controller built from the profile (convenience
/// wrapper around [`track_with`]).
pub fn track(
    profile: &TrackProfile,
    config: &LoopConfig,
    source: &mut dyn DetectionSource,
    link: &mut dyn ActuatorLink,
    clock: &mut dyn Clock,
    stop: &AtomicBool,
) -> Result<Session, TrackError> {
    let mut servo = ServoController::new(profile);
    track_with(profile, config, &mut servo, source, link, clock, stop)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
