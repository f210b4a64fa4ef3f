// ---------------------------------------------------------------------------
// Four-axis RC command (the value sent to the actuator each cycle)
// ---------------------------------------------------------------------------

/// Symmetric range each driven axis is clamped into, in RC units.
pub const AXIS_LIMIT: f64 = 100.0;

/// One cycle's worth of normalized motion commands.
///
/// Axis layout follows the usual quadcopter RC convention
/// `(left/right, forward/back, up/down, yaw)`. The servo never drives
/// `lateral`; it is kept so the command matches the four-axis wire shape
/// actuator transports expect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RcCommand {
    pub lateral: f64,       // left/right strafe, unused (always 0)
    pub longitudinal: f64,  // forward/back, driven by apparent-area error
    pub vertical: f64,      // up/down, driven by vertical pixel error
    pub yaw: f64,           // rotation, driven by horizontal pixel error
}

impl RcCommand {
    /// All-axes-zero command. Dispatched while searching and during the
    /// shutdown sequence.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        self.lateral == 0.0
            && self.longitudinal == 0.0
            && self.vertical == 0.0
            && self.yaw == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_all_zero() {
        let cmd = RcCommand::neutral();
        assert!(cmd.is_neutral());
        assert_eq!(cmd.lateral, 0.0);
        assert_eq!(cmd.longitudinal, 0.0);
        assert_eq!(cmd.vertical, 0.0);
        assert_eq!(cmd.yaw, 0.0);
    }

    #[test]
    fn non_neutral_detected() {
        let cmd = RcCommand { yaw: -25.0, ..RcCommand::neutral() };
        assert!(!cmd.is_neutral());
    }
}
