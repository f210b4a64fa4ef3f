use super::gains::ChannelGains;

// ---------------------------------------------------------------------------
// Track profile: everything static about a follow session
// ---------------------------------------------------------------------------

/// Static configuration for one tracking deployment: the frame the camera
/// delivers, which marker id to chase, the apparent-area setpoint, the
/// per-channel gains, and the reacquisition policy.
#[derive(Debug, Clone)]
pub struct TrackProfile {
    pub name: String,
    pub frame_width: f64,
    pub frame_height: f64,
    pub target_id: u32,
    pub target_area: f64,
    pub gains_x: ChannelGains,
    pub gains_y: ChannelGains,
    pub gains_area: ChannelGains,
    /// Zero the channel integrals and error history when the target is
    /// reacquired after a loss. Stale history from before the gap has no
    /// relation to the new geometry; turn this off to carry integral and
    /// previous error across the gap instead.
    pub reset_on_reacquire: bool,
}

impl TrackProfile {
    /// Horizontal center setpoint, derived from the frame width.
    pub fn center_x(&self) -> f64 {
        self.frame_width / 2.0
    }

    /// Vertical center setpoint, derived from the frame height.
    pub fn center_y(&self) -> f64 {
        self.frame_height / 2.0
    }
}

// ---------------------------------------------------------------------------
// Profile builder
// ---------------------------------------------------------------------------

pub struct ProfileBuilder {
    name: String,
    frame_width: f64,
    frame_height: f64,
    target_id: u32,
    target_area: f64,
    gains_x: ChannelGains,
    gains_y: ChannelGains,
    gains_area: ChannelGains,
    reset_on_reacquire: bool,
}

impl ProfileBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_width: 960.0,
            frame_height: 720.0,
            target_id: 0,
            target_area: 10_000.0,
            gains_x: ChannelGains::new(0.25, 0.0002, 0.03),
            gains_y: ChannelGains::new(0.25, 0.0002, 0.03),
            gains_area: ChannelGains::new(0.005, 0.0, 0.003),
            reset_on_reacquire: true,
        }
    }

    pub fn frame(mut self, width: f64, height: f64) -> Self { self.frame_width = width; self.frame_height = height; self }
    pub fn target_id(mut self, v: u32) -> Self { self.target_id = v; self }
    pub fn target_area(mut self, v: f64) -> Self { self.target_area = v; self }
    pub fn gains_x(mut self, g: ChannelGains) -> Self { self.gains_x = g; self }
    pub fn gains_y(mut self, g: ChannelGains) -> Self { self.gains_y = g; self }
    pub fn gains_area(mut self, g: ChannelGains) -> Self { self.gains_area = g; self }
    pub fn reset_on_reacquire(mut self, v: bool) -> Self { self.reset_on_reacquire = v; self }

    pub fn build(self) -> TrackProfile {
        TrackProfile {
            name: self.name,
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            target_id: self.target_id,
            target_area: self.target_area,
            gains_x: self.gains_x,
            gains_y: self.gains_y,
            gains_area: self.gains_area,
            reset_on_reacquire: self.reset_on_reacquire,
        }
    }
}

// ---------------------------------------------------------------------------
// Preset profiles
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// The reference deployment: a Tello-class quadcopter chasing marker
    /// id 0 in a 960x720 stream, holding it at 10k px^2 apparent area.
    pub fn tello() -> TrackProfile {
        ProfileBuilder::new("Tello Follow")
            .frame(960.0, 720.0)
            .target_id(0)
            .target_area(10_000.0)
            .gains_x(ChannelGains::new(0.25, 0.0002, 0.03))
            .gains_y(ChannelGains::new(0.25, 0.0002, 0.03))
            .gains_area(ChannelGains::new(0.005, 0.0, 0.003))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_derive_from_frame() {
        let p = ProfileBuilder::new("T").frame(960.0, 720.0).build();
        assert_eq!(p.center_x(), 480.0);
        assert_eq!(p.center_y(), 360.0);
    }

    #[test]
    fn tello_preset_matches_reference_tuning() {
        let p = presets::tello();
        assert_eq!(p.target_id, 0);
        assert_eq!(p.target_area, 10_000.0);
        assert_eq!(p.gains_x.kp, 0.25);
        assert_eq!(p.gains_x.ki, 0.0002);
        assert_eq!(p.gains_x.kd, 0.03);
        assert_eq!(p.gains_area.kp, 0.005);
        assert_eq!(p.gains_area.ki, 0.0);
        assert_eq!(p.gains_area.kd, 0.003);
        assert!(p.reset_on_reacquire, "safer default: reset on reacquire");
    }

    #[test]
    fn builder_overrides_stick() {
        let p = ProfileBuilder::new("Custom")
            .frame(1280.0, 720.0)
            .target_id(7)
            .reset_on_reacquire(false)
            .build();
        assert_eq!(p.center_x(), 640.0);
        assert_eq!(p.target_id, 7);
        assert!(!p.reset_on_reacquire);
    }
}
