use crate::actuate::RcCommand;
use crate::tuning::TrackProfile;
use crate::vision::TargetFix;

use super::pid::{InvalidTimestep, PidChannel};

// ---------------------------------------------------------------------------
// Servo controller: three channels steering toward the marker setpoints
// ---------------------------------------------------------------------------

/// Per-axis error terms for one cycle (setpoint minus measurement).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisError {
    pub x: f64,
    pub y: f64,
    pub area: f64,
}

/// The full visual-servo control state: three owned PID channels plus the
/// setpoints and the timestamp baseline. There is no hidden state anywhere
/// else; clone it, snapshot it, or throw it away and the loop's behavior
/// follows.
#[derive(Debug, Clone)]
pub struct ServoController {
    pub x: PidChannel,
    pub y: PidChannel,
    pub area: PidChannel,
    center_x: f64,
    center_y: f64,
    target_area: f64,
    last_update: Option<f64>,
}

impl ServoController {
    pub fn new(profile: &TrackProfile) -> Self {
        Self {
            x: PidChannel::new(profile.gains_x),
            y: PidChannel::new(profile.gains_y),
            area: PidChannel::new(profile.gains_area),
            center_x: profile.center_x(),
            center_y: profile.center_y(),
            target_area: profile.target_area,
            last_update: None,
        }
    }

    /// Set the timestamp baseline for the first cycle's dt. The loop calls
    /// this once right before it starts pulling frames.
    pub fn prime(&mut self, now: f64) {
        self.last_update = Some(now);
    }

    /// Timestamp of the most recent update (accepted or rejected), seconds.
    pub fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    /// Error terms for a fix against the configured setpoints.
    pub fn errors(&self, fix: &TargetFix) -> AxisError {
        AxisError {
            x: self.center_x - fix.cx,
            y: self.center_y - fix.cy,
            area: self.target_area - fix.area,
        }
    }

    /// Run one full control update against a fix observed at `now` and
    /// assemble the four-axis command.
    ///
    /// dt is the gap to the previous update. If it is not strictly
    /// positive (stalled stamp, regressed stamp, or a never-primed
    /// controller, which yields NaN), the update is rejected: no channel
    /// state moves, but `now` still becomes the new baseline so one bad
    /// stamp does not poison every cycle after it.
    pub fn steer(&mut self, fix: &TargetFix, now: f64) -> Result<RcCommand, InvalidTimestep> {
        let dt = match self.last_update {
            Some(prev) => now - prev,
            None => f64::NAN,
        };
        self.last_update = Some(now);
        if !(dt > 0.0) {
            return Err(InvalidTimestep { dt });
        }

        let e = self.errors(fix);
        let out_x = self.x.update(e.x, dt)?;
        let out_y = self.y.update(e.y, dt)?;
        let out_area = self.area.update(e.area, dt)?;

        // Yaw sign inversion: a marker left of center gives a positive x
        // error, and re-centering it needs a counter-clockwise turn, which
        // is negative in the RC convention (positive yaw = clockwise).
        Ok(RcCommand {
            lateral: 0.0,
            longitudinal: out_area,
            vertical: out_y,
            yaw: -out_x,
        })
    }

    /// Reset all three channels' integral/error history.
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.area.reset();
    }
}
